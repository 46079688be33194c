use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;

/// account or asset-contract identity
pub type Address = Uuid;

/// identifier of one non-fungible unit within a collateral asset
pub type TokenId = u128;

/// loan identifier, allocated monotonically and never reused
pub type LoanId = u64;

/// sentinel meaning "no loan"; real ids start at 1
pub const NO_LOAN: LoanId = 0;

/// one non-fungible collateral unit: asset contract plus token id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollateralKey {
    pub asset: Address,
    pub token_id: TokenId,
}

impl CollateralKey {
    pub fn new(asset: Address, token_id: TokenId) -> Self {
        Self { asset, token_id }
    }
}

/// loan lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanState {
    /// loan open and accruing debt
    Active,
    /// liquidation auction open, bids being taken
    Auction,
    /// voluntarily closed, collateral returned
    Repaid,
    /// seized through liquidation
    Defaulted,
}

impl LoanState {
    /// terminal states never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanState::Repaid | LoanState::Defaulted)
    }
}

/// highest bid on an open auction
///
/// present iff an auction has been opened; a defaulted loan keeps its
/// final bid as an audit trail of the winning price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuctionBid {
    pub started_at: DateTime<Utc>,
    pub bidder: Address,
    pub price: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!LoanState::Active.is_terminal());
        assert!(!LoanState::Auction.is_terminal());
        assert!(LoanState::Repaid.is_terminal());
        assert!(LoanState::Defaulted.is_terminal());
    }

    #[test]
    fn test_collateral_key_equality() {
        let asset = Uuid::new_v4();
        assert_eq!(CollateralKey::new(asset, 7), CollateralKey::new(asset, 7));
        assert_ne!(CollateralKey::new(asset, 7), CollateralKey::new(asset, 8));
        assert_ne!(
            CollateralKey::new(asset, 7),
            CollateralKey::new(Uuid::new_v4(), 7)
        );
    }
}
