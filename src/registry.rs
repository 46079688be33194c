use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::decimal::{DebtIndex, Money, ScaledDebt};
use crate::types::{Address, AuctionBid, CollateralKey, LoanId, LoanState, NO_LOAN};

/// canonical record of one loan
///
/// identity is immutable after creation; terminal records are kept
/// forever as an audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: LoanId,
    pub state: LoanState,
    pub borrower: Address,
    pub collateral: CollateralKey,
    pub reserve: Address,
    pub scaled_debt: ScaledDebt,
    pub auction: Option<AuctionBid>,
}

impl Loan {
    /// a freshly created loan is Active with no auction open
    pub fn new(
        loan_id: LoanId,
        borrower: Address,
        collateral: CollateralKey,
        reserve: Address,
        scaled_debt: ScaledDebt,
    ) -> Self {
        Self {
            loan_id,
            state: LoanState::Active,
            borrower,
            collateral,
            reserve,
            scaled_debt,
            auction: None,
        }
    }

    /// outstanding debt including interest accrued up to `index`
    pub fn debt_at(&self, index: DebtIndex) -> Money {
        index.scale_up(self.scaled_debt)
    }
}

/// owns every loan record and the id allocator
///
/// reads are open to anyone; all mutation goes through the lifecycle
/// controller in this crate
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LoanRegistry {
    loans: BTreeMap<LoanId, Loan>,
    next_id: LoanId,
}

impl LoanRegistry {
    pub fn new() -> Self {
        Self {
            loans: BTreeMap::new(),
            next_id: NO_LOAN + 1,
        }
    }

    /// hand out the next loan id; ids are never reused
    pub(crate) fn allocate_id(&mut self) -> LoanId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// undo the most recent allocation, only valid while the id is
    /// still uninserted (aborted creation)
    pub(crate) fn rewind_id(&mut self, id: LoanId) {
        debug_assert_eq!(id + 1, self.next_id);
        debug_assert!(!self.loans.contains_key(&id));
        self.next_id = id;
    }

    pub(crate) fn insert(&mut self, loan: Loan) {
        self.loans.insert(loan.loan_id, loan);
    }

    /// drop an uncommitted record during an aborted creation; settled
    /// loans are never removed
    pub(crate) fn remove(&mut self, loan_id: LoanId) -> Option<Loan> {
        self.loans.remove(&loan_id)
    }

    pub(crate) fn get_mut(&mut self, loan_id: LoanId) -> Option<&mut Loan> {
        self.loans.get_mut(&loan_id)
    }

    /// look up a loan by id
    pub fn loan(&self, loan_id: LoanId) -> Option<&Loan> {
        self.loans.get(&loan_id)
    }

    /// borrower of a loan
    pub fn borrower_of(&self, loan_id: LoanId) -> Option<Address> {
        self.loans.get(&loan_id).map(|l| l.borrower)
    }

    /// collateral unit and reserve denomination of a loan
    pub fn collateral_and_reserve_of(&self, loan_id: LoanId) -> Option<(CollateralKey, Address)> {
        self.loans.get(&loan_id).map(|l| (l.collateral, l.reserve))
    }

    /// scaled (index-normalized) debt of a loan
    pub fn scaled_debt_of(&self, loan_id: LoanId) -> Option<ScaledDebt> {
        self.loans.get(&loan_id).map(|l| l.scaled_debt)
    }

    /// debt of a loan with interest accrued up to `index`
    pub fn debt_of(&self, loan_id: LoanId, index: DebtIndex) -> Option<Money> {
        self.loans.get(&loan_id).map(|l| l.debt_at(index))
    }

    /// total loans ever created, terminal ones included
    pub fn loan_count(&self) -> usize {
        self.loans.len()
    }

    /// iterate all records in id order
    pub fn loans(&self) -> impl Iterator<Item = &Loan> {
        self.loans.values()
    }
}
