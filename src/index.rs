use std::collections::HashMap;

use crate::errors::{LedgerError, Result};
use crate::types::{Address, CollateralKey, LoanId, NO_LOAN};

/// reverse lookup and aggregate counters over encumbered collateral
///
/// both counters always equal the number of non-terminal loans for
/// their key: registered exactly once when a loan is created, released
/// exactly once when it reaches a terminal state
#[derive(Debug, Default)]
pub struct CollateralIndex {
    active: HashMap<CollateralKey, LoanId>,
    per_asset: HashMap<Address, u64>,
    per_user: HashMap<(Address, Address), u64>,
}

impl CollateralIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// loan currently encumbering a collateral unit, NO_LOAN if free
    pub fn active_loan_for(&self, collateral: &CollateralKey) -> LoanId {
        self.active.get(collateral).copied().unwrap_or(NO_LOAN)
    }

    /// encumbered units of one collateral asset across all borrowers
    pub fn total_encumbered(&self, asset: Address) -> u64 {
        self.per_asset.get(&asset).copied().unwrap_or(0)
    }

    /// encumbered units of one collateral asset held against one borrower
    pub fn encumbered_by_user(&self, user: Address, asset: Address) -> u64 {
        self.per_user.get(&(user, asset)).copied().unwrap_or(0)
    }

    /// record a new encumbrance; fails if the unit is already taken
    pub(crate) fn register(
        &mut self,
        collateral: CollateralKey,
        loan_id: LoanId,
        borrower: Address,
    ) -> Result<()> {
        if let Some(&holder) = self.active.get(&collateral) {
            return Err(LedgerError::CollateralAlreadyEncumbered {
                collateral,
                loan_id: holder,
            });
        }
        self.active.insert(collateral, loan_id);
        *self.per_asset.entry(collateral.asset).or_insert(0) += 1;
        *self.per_user.entry((borrower, collateral.asset)).or_insert(0) += 1;
        Ok(())
    }

    /// clear an encumbrance as its loan turns terminal
    pub(crate) fn release(
        &mut self,
        collateral: CollateralKey,
        borrower: Address,
    ) -> Result<LoanId> {
        let loan_id = self
            .active
            .remove(&collateral)
            .ok_or(LedgerError::CollateralCountUnderflow {
                asset: collateral.asset,
            })?;

        let asset_count = self.per_asset.get_mut(&collateral.asset).filter(|c| **c > 0);
        let user_count = self
            .per_user
            .get_mut(&(borrower, collateral.asset))
            .filter(|c| **c > 0);
        match (asset_count, user_count) {
            (Some(asset_count), Some(user_count)) => {
                *asset_count -= 1;
                *user_count -= 1;
                Ok(loan_id)
            }
            _ => {
                // counters out of step with the lookup; restore and refuse
                self.active.insert(collateral, loan_id);
                Err(LedgerError::CollateralCountUnderflow {
                    asset: collateral.asset,
                })
            }
        }
    }
}
