use hourglass_rs::SafeTimeProvider;

use crate::custody::CollateralGateway;
use crate::decimal::{DebtIndex, Money, ScaledDebt};
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::index::CollateralIndex;
use crate::registry::{Loan, LoanRegistry};
use crate::types::{Address, AuctionBid, CollateralKey, LoanId, LoanState, NO_LOAN};

/// lifecycle controller over the loan registry and collateral index
///
/// every mutating operation is a serialized transaction: preconditions
/// are checked first, all registry/index bookkeeping commits next, and
/// only then does the collateral gateway move assets. a gateway failure
/// rolls the commit back in full, so a failed call leaves no trace and
/// a callback from the gateway always observes a consistent ledger
pub struct LoanLedger {
    provider: Address,
    pool: Option<Address>,
    registry: LoanRegistry,
    index: CollateralIndex,
    events: EventStore,
}

impl LoanLedger {
    /// create a ledger administered by `provider`; no pool is authorized
    /// yet, so every lifecycle operation fails until `authorize_pool`
    pub fn new(provider: Address) -> Self {
        Self {
            provider,
            pool: None,
            registry: LoanRegistry::new(),
            index: CollateralIndex::new(),
            events: EventStore::new(),
        }
    }

    /// wire up the pool allowed to drive lifecycle operations;
    /// restricted to the provider named at construction
    pub fn authorize_pool(
        &mut self,
        caller: Address,
        pool: Address,
        time_provider: &SafeTimeProvider,
    ) -> Result<()> {
        if caller != self.provider {
            return Err(LedgerError::CallerNotProvider { caller });
        }
        self.pool = Some(pool);
        self.events.emit(Event::PoolAuthorized {
            pool,
            timestamp: time_provider.now(),
        });
        Ok(())
    }

    pub fn provider(&self) -> Address {
        self.provider
    }

    pub fn pool(&self) -> Option<Address> {
        self.pool
    }

    /// read access to loan records
    pub fn registry(&self) -> &LoanRegistry {
        &self.registry
    }

    /// read access to the collateral index
    pub fn collateral_index(&self) -> &CollateralIndex {
        &self.index
    }

    /// drain events collected since the last call
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    /// events collected so far
    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    /// open a loan against one collateral unit
    ///
    /// allocates a fresh id, records the encumbrance, normalizes the
    /// principal by the current debt index, then pulls the collateral
    /// into custody and mints the receipt token to the borrower
    #[allow(clippy::too_many_arguments)]
    pub fn create_loan(
        &mut self,
        caller: Address,
        borrower: Address,
        collateral: CollateralKey,
        receipt_token: Address,
        reserve: Address,
        principal: Money,
        index: DebtIndex,
        gateway: &mut dyn CollateralGateway,
        time_provider: &SafeTimeProvider,
    ) -> Result<LoanId> {
        self.require_pool(caller)?;
        let scaled_debt = scaled_or_fail(principal, index)?;

        let holder = self.index.active_loan_for(&collateral);
        if holder != NO_LOAN {
            return Err(LedgerError::CollateralAlreadyEncumbered {
                collateral,
                loan_id: holder,
            });
        }

        // commit phase
        let loan_id = self.registry.allocate_id();
        self.registry
            .insert(Loan::new(loan_id, borrower, collateral, reserve, scaled_debt));
        self.index.register(collateral, loan_id, borrower)?;

        // effect phase
        if let Err(err) = gateway.take_custody(collateral, borrower) {
            self.abort_creation(loan_id, collateral, borrower);
            return Err(err.into());
        }
        if let Err(err) = gateway.mint_receipt(receipt_token, borrower, collateral) {
            // unwind the custody transfer before dropping the record
            let _ = gateway.release_custody(collateral, borrower);
            self.abort_creation(loan_id, collateral, borrower);
            return Err(err.into());
        }

        self.events.emit(Event::LoanCreated {
            loan_id,
            borrower,
            collateral,
            reserve,
            principal,
            scaled_debt,
            timestamp: time_provider.now(),
        });

        Ok(loan_id)
    }

    /// adjust the debt of an active loan by index-scaled deltas
    ///
    /// both deltas are normalized by `index` before touching the scaled
    /// balance; a non-zero delta that truncates to zero is rejected so
    /// repeated sub-threshold calls cannot leak debt
    pub fn update_loan(
        &mut self,
        caller: Address,
        loan_id: LoanId,
        amount_added: Money,
        amount_taken: Money,
        index: DebtIndex,
        time_provider: &SafeTimeProvider,
    ) -> Result<()> {
        self.require_pool(caller)?;
        let added = scaled_or_fail(amount_added, index)?;
        let taken = scaled_or_fail(amount_taken, index)?;

        let loan = self
            .registry
            .get_mut(loan_id)
            .ok_or(LedgerError::LoanNotFound { loan_id })?;
        require_state(loan, LoanState::Active)?;

        let grown = loan.scaled_debt + added;
        loan.scaled_debt = grown
            .checked_sub(taken)
            .ok_or(LedgerError::ScaledDebtUnderflow {
                balance: grown,
                requested: taken,
            })?;

        let reserve = loan.reserve;
        let scaled_debt = loan.scaled_debt;
        self.events.emit(Event::LoanUpdated {
            loan_id,
            reserve,
            amount_added,
            amount_taken,
            scaled_debt,
            timestamp: time_provider.now(),
        });

        Ok(())
    }

    /// voluntarily close an active loan
    ///
    /// marks the loan Repaid and clears its encumbrance before burning
    /// the receipt token and returning the collateral to `recipient`;
    /// returns the debt settled, interest accrued up to `index` included
    #[allow(clippy::too_many_arguments)]
    pub fn repay_loan(
        &mut self,
        caller: Address,
        loan_id: LoanId,
        recipient: Address,
        receipt_token: Address,
        index: DebtIndex,
        gateway: &mut dyn CollateralGateway,
        time_provider: &SafeTimeProvider,
    ) -> Result<Money> {
        self.require_pool(caller)?;
        if !index.is_valid() {
            return Err(LedgerError::InvalidDebtIndex { index });
        }

        let settled = self.close_loan(loan_id, LoanState::Active, LoanState::Repaid)?;
        let amount = index.scale_up(settled.scaled_debt);

        // effect phase
        self.settle_custody(&settled, recipient, receipt_token, gateway)?;

        self.events.emit(Event::LoanRepaid {
            loan_id,
            borrower: settled.borrower,
            collateral: settled.collateral,
            reserve: settled.reserve,
            amount,
            recipient,
            timestamp: time_provider.now(),
        });

        Ok(amount)
    }

    /// open an auction on an active loan, or raise the highest bid on
    /// one already open
    ///
    /// the opening bid is accepted unconditionally; a later bid must
    /// strictly exceed the current highest. no assets move here, the
    /// bid is only recorded until liquidation
    pub fn auction_loan(
        &mut self,
        caller: Address,
        bidder: Address,
        loan_id: LoanId,
        price: Money,
        time_provider: &SafeTimeProvider,
    ) -> Result<()> {
        self.require_pool(caller)?;
        if !price.is_positive() {
            return Err(LedgerError::BidNotPositive { bid: price });
        }

        let loan = self
            .registry
            .get_mut(loan_id)
            .ok_or(LedgerError::LoanNotFound { loan_id })?;

        let (previous_bidder, previous_price) = match loan.auction {
            None => {
                require_state(loan, LoanState::Active)?;
                loan.state = LoanState::Auction;
                loan.auction = Some(AuctionBid {
                    started_at: time_provider.now(),
                    bidder,
                    price,
                });
                (None, Money::ZERO)
            }
            Some(current) => {
                require_state(loan, LoanState::Auction)?;
                if price <= current.price {
                    return Err(LedgerError::BidTooLow {
                        bid: price,
                        highest: current.price,
                    });
                }
                loan.auction = Some(AuctionBid {
                    started_at: current.started_at,
                    bidder,
                    price,
                });
                (Some(current.bidder), current.price)
            }
        };

        let collateral = loan.collateral;
        self.events.emit(Event::LoanAuctioned {
            loan_id,
            collateral,
            bidder,
            price,
            previous_bidder,
            previous_price,
            timestamp: time_provider.now(),
        });

        Ok(())
    }

    /// unwind an open auction, returning the loan to Active
    pub fn undo_auction_loan(
        &mut self,
        caller: Address,
        loan_id: LoanId,
        time_provider: &SafeTimeProvider,
    ) -> Result<()> {
        self.require_pool(caller)?;

        let loan = self
            .registry
            .get_mut(loan_id)
            .ok_or(LedgerError::LoanNotFound { loan_id })?;
        require_state(loan, LoanState::Auction)?;

        // state Auction guarantees an open bid
        let dropped = loan.auction.take().ok_or(LedgerError::InvalidLoanState {
            loan_id,
            current: loan.state,
            expected: LoanState::Auction,
        })?;
        loan.state = LoanState::Active;

        let collateral = loan.collateral;
        self.events.emit(Event::AuctionUndone {
            loan_id,
            collateral,
            dropped_bidder: dropped.bidder,
            dropped_price: dropped.price,
            timestamp: time_provider.now(),
        });

        Ok(())
    }

    /// seize the collateral of an auctioned loan
    ///
    /// marks the loan Defaulted and clears its encumbrance before
    /// burning the receipt token and handing the collateral to
    /// `recipient`; the winning bid stays on the record as audit trail
    #[allow(clippy::too_many_arguments)]
    pub fn liquidate_loan(
        &mut self,
        caller: Address,
        recipient: Address,
        loan_id: LoanId,
        receipt_token: Address,
        index: DebtIndex,
        gateway: &mut dyn CollateralGateway,
        time_provider: &SafeTimeProvider,
    ) -> Result<Money> {
        self.require_pool(caller)?;
        if !index.is_valid() {
            return Err(LedgerError::InvalidDebtIndex { index });
        }

        let settled = self.close_loan(loan_id, LoanState::Auction, LoanState::Defaulted)?;
        let amount = index.scale_up(settled.scaled_debt);

        // effect phase
        self.settle_custody(&settled, recipient, receipt_token, gateway)?;

        self.events.emit(Event::LoanLiquidated {
            loan_id,
            borrower: settled.borrower,
            collateral: settled.collateral,
            reserve: settled.reserve,
            amount,
            winning_bid: settled.winning_bid,
            recipient,
            timestamp: time_provider.now(),
        });

        Ok(amount)
    }

    fn require_pool(&self, caller: Address) -> Result<()> {
        match self.pool {
            None => Err(LedgerError::PoolNotSet),
            Some(pool) if pool != caller => Err(LedgerError::CallerNotPool { caller }),
            Some(_) => Ok(()),
        }
    }

    /// commit phase of repay/liquidate: clear the encumbrance and move
    /// the loan to its terminal state, capturing what the effect phase
    /// and rollback need
    fn close_loan(
        &mut self,
        loan_id: LoanId,
        expected: LoanState,
        terminal: LoanState,
    ) -> Result<SettledLoan> {
        let loan = self
            .registry
            .get_mut(loan_id)
            .ok_or(LedgerError::LoanNotFound { loan_id })?;
        require_state(loan, expected)?;

        let settled = SettledLoan {
            loan_id,
            borrower: loan.borrower,
            collateral: loan.collateral,
            reserve: loan.reserve,
            scaled_debt: loan.scaled_debt,
            winning_bid: loan.auction.map(|bid| bid.price).unwrap_or(Money::ZERO),
            prior_state: loan.state,
        };

        self.index.release(settled.collateral, settled.borrower)?;
        if let Some(loan) = self.registry.get_mut(loan_id) {
            loan.state = terminal;
        }

        Ok(settled)
    }

    /// effect phase of repay/liquidate; rolls the commit back on failure
    fn settle_custody(
        &mut self,
        settled: &SettledLoan,
        recipient: Address,
        receipt_token: Address,
        gateway: &mut dyn CollateralGateway,
    ) -> Result<()> {
        if let Err(err) = gateway.burn_receipt(receipt_token, settled.collateral) {
            self.reopen_loan(settled);
            return Err(err.into());
        }
        if let Err(err) = gateway.release_custody(settled.collateral, recipient) {
            // unwind the burn before restoring the record
            let _ = gateway.mint_receipt(receipt_token, settled.borrower, settled.collateral);
            self.reopen_loan(settled);
            return Err(err.into());
        }
        Ok(())
    }

    /// rollback of `close_loan`
    fn reopen_loan(&mut self, settled: &SettledLoan) {
        let restored = self
            .index
            .register(settled.collateral, settled.loan_id, settled.borrower);
        debug_assert!(restored.is_ok());
        if let Some(loan) = self.registry.get_mut(settled.loan_id) {
            loan.state = settled.prior_state;
        }
    }

    /// rollback of a creation commit
    fn abort_creation(&mut self, loan_id: LoanId, collateral: CollateralKey, borrower: Address) {
        let released = self.index.release(collateral, borrower);
        debug_assert!(released.is_ok());
        self.registry.remove(loan_id);
        self.registry.rewind_id(loan_id);
    }
}

/// snapshot of a loan taken by the commit phase of a terminal transition
struct SettledLoan {
    loan_id: LoanId,
    borrower: Address,
    collateral: CollateralKey,
    reserve: Address,
    scaled_debt: ScaledDebt,
    winning_bid: Money,
    prior_state: LoanState,
}

fn require_state(loan: &Loan, expected: LoanState) -> Result<()> {
    if loan.state != expected {
        return Err(LedgerError::InvalidLoanState {
            loan_id: loan.loan_id,
            current: loan.state,
            expected,
        });
    }
    Ok(())
}

/// normalize a raw amount by the debt index, refusing degenerate results
///
/// a non-zero amount whose scaled form truncates to zero signals a
/// precision misuse by the caller and must fail rather than no-op
fn scaled_or_fail(amount: Money, index: DebtIndex) -> Result<ScaledDebt> {
    if !index.is_valid() {
        return Err(LedgerError::InvalidDebtIndex { index });
    }
    if amount < Money::ZERO {
        return Err(LedgerError::NegativeAmount { amount });
    }
    let scaled = index.scale_down(amount);
    if scaled.is_zero() && !amount.is_zero() {
        return Err(LedgerError::AmountScalesToZero { amount, index });
    }
    Ok(scaled)
}
