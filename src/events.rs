use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, ScaledDebt};
use crate::types::{Address, CollateralKey, LoanId};

/// all events emitted by the loan ledger, one per lifecycle transition,
/// carrying what an off-chain indexer needs to reconcile state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    PoolAuthorized {
        pool: Address,
        timestamp: DateTime<Utc>,
    },

    LoanCreated {
        loan_id: LoanId,
        borrower: Address,
        collateral: CollateralKey,
        reserve: Address,
        principal: Money,
        scaled_debt: ScaledDebt,
        timestamp: DateTime<Utc>,
    },

    LoanUpdated {
        loan_id: LoanId,
        reserve: Address,
        amount_added: Money,
        amount_taken: Money,
        scaled_debt: ScaledDebt,
        timestamp: DateTime<Utc>,
    },

    LoanRepaid {
        loan_id: LoanId,
        borrower: Address,
        collateral: CollateralKey,
        reserve: Address,
        /// debt settled, including accrued interest
        amount: Money,
        recipient: Address,
        timestamp: DateTime<Utc>,
    },

    /// auction opened or highest bid replaced; previous bidder is None
    /// on the opening bid
    LoanAuctioned {
        loan_id: LoanId,
        collateral: CollateralKey,
        bidder: Address,
        price: Money,
        previous_bidder: Option<Address>,
        previous_price: Money,
        timestamp: DateTime<Utc>,
    },

    AuctionUndone {
        loan_id: LoanId,
        collateral: CollateralKey,
        dropped_bidder: Address,
        dropped_price: Money,
        timestamp: DateTime<Utc>,
    },

    LoanLiquidated {
        loan_id: LoanId,
        borrower: Address,
        collateral: CollateralKey,
        reserve: Address,
        /// outstanding debt written off, including accrued interest
        amount: Money,
        winning_bid: Money,
        recipient: Address,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
