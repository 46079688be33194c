use thiserror::Error;

use crate::custody::CustodyError;
use crate::decimal::{DebtIndex, Money, ScaledDebt};
use crate::types::{Address, CollateralKey, LoanId, LoanState};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("caller {caller} is not the authorized pool")]
    CallerNotPool {
        caller: Address,
    },

    #[error("caller {caller} is not the provider")]
    CallerNotProvider {
        caller: Address,
    },

    #[error("no pool has been authorized yet")]
    PoolNotSet,

    #[error("loan not found: {loan_id}")]
    LoanNotFound {
        loan_id: LoanId,
    },

    #[error("loan {loan_id} is {current:?}, expected {expected:?}")]
    InvalidLoanState {
        loan_id: LoanId,
        current: LoanState,
        expected: LoanState,
    },

    #[error("collateral {collateral:?} already encumbered by loan {loan_id}")]
    CollateralAlreadyEncumbered {
        collateral: CollateralKey,
        loan_id: LoanId,
    },

    #[error("invalid debt index: {index}")]
    InvalidDebtIndex {
        index: DebtIndex,
    },

    #[error("amount must not be negative: {amount}")]
    NegativeAmount {
        amount: Money,
    },

    #[error("amount {amount} truncates to zero at index {index}")]
    AmountScalesToZero {
        amount: Money,
        index: DebtIndex,
    },

    #[error("scaled debt underflow: balance {balance}, subtracting {requested}")]
    ScaledDebtUnderflow {
        balance: ScaledDebt,
        requested: ScaledDebt,
    },

    #[error("bid {bid} does not exceed highest bid {highest}")]
    BidTooLow {
        bid: Money,
        highest: Money,
    },

    #[error("bid price must be positive, got {bid}")]
    BidNotPositive {
        bid: Money,
    },

    #[error("collateral counter underflow for asset {asset}")]
    CollateralCountUnderflow {
        asset: Address,
    },

    #[error(transparent)]
    Custody(#[from] CustodyError),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
