use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

/// number of fractional digits carried by Money and ScaledDebt
const DEBT_SCALE: u32 = 8;

/// Money type with 8 decimal places precision for raw reserve-asset amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const ONE: Money = Money(Decimal::ONE);

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d.round_dp(DEBT_SCALE))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(Decimal::from_str(s)?.round_dp(DEBT_SCALE)))
    }

    /// create from integer amount (whole reserve units)
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from minor amount (e.g. cents, satoshis)
    pub fn from_minor(amount: i64, scale: u32) -> Self {
        let d = Decimal::from(amount) / Decimal::from(10_u64.pow(scale));
        Money(d.round_dp(DEBT_SCALE))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// check if zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// check if strictly positive
    pub fn is_positive(&self) -> bool {
        !self.0.is_zero() && self.0.is_sign_positive()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl From<i32> for Money {
    fn from(i: i32) -> Self {
        Money::from_major(i as i64)
    }
}

impl From<u32> for Money {
    fn from(i: u32) -> Self {
        Money::from_major(i as i64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money((self.0 + other.0).round_dp(DEBT_SCALE))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 = (self.0 + other.0).round_dp(DEBT_SCALE);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money((self.0 - other.0).round_dp(DEBT_SCALE))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 = (self.0 - other.0).round_dp(DEBT_SCALE);
    }
}

/// index-normalized debt balance
///
/// a scaled balance only ever changes by index-scaled addition or
/// subtraction, so multiplying it by the current debt index always
/// yields the amount owed including accrued interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct ScaledDebt(Decimal);

impl ScaledDebt {
    pub const ZERO: ScaledDebt = ScaledDebt(Decimal::ZERO);

    /// create from decimal, truncating toward zero
    pub fn from_decimal(d: Decimal) -> Self {
        ScaledDebt(d.trunc_with_scale(DEBT_SCALE))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// check if zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// subtraction that refuses to go negative
    pub fn checked_sub(self, other: ScaledDebt) -> Option<ScaledDebt> {
        if other.0 > self.0 {
            None
        } else {
            Some(ScaledDebt(self.0 - other.0))
        }
    }
}

impl fmt::Display for ScaledDebt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for ScaledDebt {
    type Output = ScaledDebt;

    fn add(self, other: ScaledDebt) -> ScaledDebt {
        ScaledDebt(self.0 + other.0)
    }
}

/// cumulative variable-debt index of a reserve asset
///
/// opaque, monotonically non-decreasing scalar supplied by the caller;
/// unit value means no interest has accrued. conversions truncate toward
/// zero so repeated scaling can never create debt out of rounding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DebtIndex(Decimal);

impl DebtIndex {
    pub const UNIT: DebtIndex = DebtIndex(Decimal::ONE);

    /// create from decimal (a unit index is 1.0)
    pub fn from_decimal(d: Decimal) -> Self {
        DebtIndex(d)
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// check the index is usable for scaling
    pub fn is_valid(&self) -> bool {
        !self.0.is_zero() && self.0.is_sign_positive()
    }

    /// convert a raw amount to its scaled form, truncating toward zero
    pub fn scale_down(&self, amount: Money) -> ScaledDebt {
        ScaledDebt::from_decimal(amount.as_decimal() / self.0)
    }

    /// convert a scaled balance back to a raw amount, truncating toward zero
    pub fn scale_up(&self, scaled: ScaledDebt) -> Money {
        Money::from_decimal((scaled.as_decimal() * self.0).trunc_with_scale(DEBT_SCALE))
    }
}

impl Default for DebtIndex {
    fn default() -> Self {
        DebtIndex::UNIT
    }
}

impl fmt::Display for DebtIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Decimal> for DebtIndex {
    fn from(d: Decimal) -> Self {
        DebtIndex::from_decimal(d)
    }
}
