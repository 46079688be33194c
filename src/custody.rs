use std::collections::HashMap;

use thiserror::Error;

use crate::types::{Address, CollateralKey};

/// failures reported by the custody side of the system
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CustodyError {
    #[error("collateral {collateral:?} is not held by {holder}")]
    NotHeld {
        collateral: CollateralKey,
        holder: Address,
    },

    #[error("unknown collateral unit {collateral:?}")]
    UnknownCollateral {
        collateral: CollateralKey,
    },

    #[error("receipt already minted for {collateral:?}")]
    ReceiptExists {
        collateral: CollateralKey,
    },

    #[error("no receipt minted for {collateral:?}")]
    ReceiptMissing {
        collateral: CollateralKey,
    },

    #[error("custody operation rejected: {message}")]
    Rejected {
        message: String,
    },
}

/// the ledger's seam to collateral custody and the receipt token
///
/// the ledger calls these exactly once per creation, repayment, or
/// liquidation, and always after its own bookkeeping has committed, so
/// an implementation that calls back in observes a consistent ledger
pub trait CollateralGateway {
    /// pull the collateral unit out of `from`'s hands into ledger custody
    fn take_custody(&mut self, collateral: CollateralKey, from: Address)
        -> Result<(), CustodyError>;

    /// hand a custodied collateral unit to `to`
    fn release_custody(&mut self, collateral: CollateralKey, to: Address)
        -> Result<(), CustodyError>;

    /// mint the receipt token for an encumbered unit to its borrower
    fn mint_receipt(
        &mut self,
        receipt_token: Address,
        owner: Address,
        collateral: CollateralKey,
    ) -> Result<(), CustodyError>;

    /// burn the receipt token of a unit leaving custody
    fn burn_receipt(
        &mut self,
        receipt_token: Address,
        collateral: CollateralKey,
    ) -> Result<(), CustodyError>;
}

/// in-memory custody book for tests and simulations
///
/// tracks which address holds each non-fungible unit and which receipt
/// tokens are outstanding; the ledger itself appears as `custodian`
#[derive(Debug, Clone)]
pub struct InMemoryGateway {
    custodian: Address,
    holders: HashMap<CollateralKey, Address>,
    receipts: HashMap<CollateralKey, (Address, Address)>, // (receipt token, owner)
}

impl InMemoryGateway {
    pub fn new(custodian: Address) -> Self {
        Self {
            custodian,
            holders: HashMap::new(),
            receipts: HashMap::new(),
        }
    }

    /// put a collateral unit into existence, held by `owner`
    pub fn seed(&mut self, collateral: CollateralKey, owner: Address) {
        self.holders.insert(collateral, owner);
    }

    pub fn holder_of(&self, collateral: &CollateralKey) -> Option<Address> {
        self.holders.get(collateral).copied()
    }

    pub fn receipt_owner(&self, collateral: &CollateralKey) -> Option<Address> {
        self.receipts.get(collateral).map(|(_, owner)| *owner)
    }

    pub fn in_custody(&self, collateral: &CollateralKey) -> bool {
        self.holders.get(collateral) == Some(&self.custodian)
    }
}

impl CollateralGateway for InMemoryGateway {
    fn take_custody(
        &mut self,
        collateral: CollateralKey,
        from: Address,
    ) -> Result<(), CustodyError> {
        match self.holders.get_mut(&collateral) {
            None => Err(CustodyError::UnknownCollateral { collateral }),
            Some(holder) if *holder != from => Err(CustodyError::NotHeld {
                collateral,
                holder: from,
            }),
            Some(holder) => {
                *holder = self.custodian;
                Ok(())
            }
        }
    }

    fn release_custody(
        &mut self,
        collateral: CollateralKey,
        to: Address,
    ) -> Result<(), CustodyError> {
        match self.holders.get_mut(&collateral) {
            None => Err(CustodyError::UnknownCollateral { collateral }),
            Some(holder) if *holder != self.custodian => Err(CustodyError::NotHeld {
                collateral,
                holder: self.custodian,
            }),
            Some(holder) => {
                *holder = to;
                Ok(())
            }
        }
    }

    fn mint_receipt(
        &mut self,
        receipt_token: Address,
        owner: Address,
        collateral: CollateralKey,
    ) -> Result<(), CustodyError> {
        if self.receipts.contains_key(&collateral) {
            return Err(CustodyError::ReceiptExists { collateral });
        }
        self.receipts.insert(collateral, (receipt_token, owner));
        Ok(())
    }

    fn burn_receipt(
        &mut self,
        _receipt_token: Address,
        collateral: CollateralKey,
    ) -> Result<(), CustodyError> {
        self.receipts
            .remove(&collateral)
            .map(|_| ())
            .ok_or(CustodyError::ReceiptMissing { collateral })
    }
}
