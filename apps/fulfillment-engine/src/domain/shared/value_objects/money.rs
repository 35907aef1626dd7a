//! Money value object for currency amounts.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

use super::Quantity;
use crate::domain::shared::DomainError;

/// Currencies the marketplace can display.
///
/// Only the display layer cares about the currency; every computation runs on
/// integer minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US dollar (cents).
    #[default]
    Usd,
    /// Euro (cents).
    Eur,
    /// Pound sterling (pence).
    Gbp,
    /// Canadian dollar (cents).
    Cad,
    /// Japanese yen (no minor unit).
    Jpy,
}

impl Currency {
    /// Number of decimal digits between the major and minor unit.
    #[must_use]
    pub const fn minor_unit_exponent(&self) -> u32 {
        match self {
            Self::Usd | Self::Eur | Self::Gbp | Self::Cad => 2,
            Self::Jpy => 0,
        }
    }

    /// Display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Eur => "€",
            Self::Gbp => "£",
            Self::Cad => "CA$",
            Self::Jpy => "¥",
        }
    }

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Cad => "CAD",
            Self::Jpy => "JPY",
        }
    }
}

/// A monetary amount as an integer count of the currency's smallest unit.
///
/// Line totals are exact (`unit_price * quantity` never rounds). Derived
/// fields that involve a rate are rounded exactly once, half-to-even, at the
/// minor-unit boundary.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Create a Money value from minor units (e.g. cents).
    #[must_use]
    pub const fn from_minor(units: i64) -> Self {
        Self(units)
    }

    /// Get the amount in minor units.
    #[must_use]
    pub const fn minor_units(&self) -> i64 {
        self.0
    }

    /// Convert a major-unit decimal (e.g. dollars) into minor units,
    /// rounding half-to-even if the input carries more precision.
    ///
    /// # Errors
    ///
    /// Returns error if the amount does not fit in an `i64` of minor units.
    pub fn from_major(amount: Decimal, exponent: u32) -> Result<Self, DomainError> {
        let scale = Decimal::from(10_i64.pow(exponent));
        amount
            .checked_mul(scale)
            .map(|d| d.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven))
            .and_then(|d| d.to_i64())
            .map(Self)
            .ok_or_else(|| DomainError::Overflow {
                operation: format!("convert {amount} to minor units"),
            })
    }

    /// Convert to a major-unit decimal for display.
    #[must_use]
    pub fn to_major(&self, exponent: u32) -> Decimal {
        Decimal::new(self.0, exponent)
    }

    /// Format for display in the given currency, e.g. `$96.77`.
    #[must_use]
    pub fn format(&self, currency: Currency) -> String {
        let exponent = currency.minor_unit_exponent() as usize;
        let major = self.to_major(currency.minor_unit_exponent()).abs();
        let sign = if self.is_negative() { "-" } else { "" };
        format!("{sign}{}{major:.exponent$}", currency.symbol())
    }

    /// Returns true if this amount is positive.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Returns true if this amount is negative.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns true if this amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns error on overflow.
    pub fn checked_add(self, rhs: Self) -> Result<Self, DomainError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or_else(|| DomainError::Overflow {
                operation: format!("{} + {}", self.0, rhs.0),
            })
    }

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns error on overflow.
    pub fn checked_sub(self, rhs: Self) -> Result<Self, DomainError> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or_else(|| DomainError::Overflow {
                operation: format!("{} - {}", self.0, rhs.0),
            })
    }

    /// Addition clamped to the representable range.
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Exact line total: `self * quantity`, no rounding involved.
    ///
    /// # Errors
    ///
    /// Returns error on overflow.
    pub fn times(self, quantity: Quantity) -> Result<Self, DomainError> {
        self.0
            .checked_mul(i64::from(quantity.value()))
            .map(Self)
            .ok_or_else(|| DomainError::Overflow {
                operation: format!("{} * {}", self.0, quantity.value()),
            })
    }

    /// Apply a rate (e.g. a tax rate) and round half-to-even to a whole
    /// minor unit.
    ///
    /// # Errors
    ///
    /// Returns error on overflow.
    pub fn apply_rate(self, rate: Decimal) -> Result<Self, DomainError> {
        Decimal::from(self.0)
            .checked_mul(rate)
            .map(|d| d.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven))
            .and_then(|d| d.to_i64())
            .map(Self)
            .ok_or_else(|| DomainError::Overflow {
                operation: format!("{} * {rate}", self.0),
            })
    }

    /// Divide into `parts` equal shares, rounded half-to-even.
    ///
    /// Returns zero when `parts` is zero.
    #[must_use]
    pub fn average_over(self, parts: usize) -> Self {
        if parts == 0 {
            return Self::ZERO;
        }
        let share = Decimal::from(self.0) / Decimal::from(parts as u64);
        share
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            .to_i64()
            .map_or(Self::ZERO, Self)
    }

    /// Sum an iterator of amounts with overflow checking.
    ///
    /// # Errors
    ///
    /// Returns error on overflow.
    pub fn checked_sum<I>(amounts: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = Self>,
    {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |acc, amount| acc.checked_add(amount))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(Currency::Usd))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<i64> for Money {
    fn from(units: i64) -> Self {
        Self(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn money_from_minor_and_display() {
        let m = Money::from_minor(9677);
        assert_eq!(m.minor_units(), 9677);
        assert_eq!(format!("{m}"), "$96.77");
    }

    #[test]
    fn money_format_per_currency() {
        assert_eq!(Money::from_minor(1050).format(Currency::Eur), "€10.50");
        assert_eq!(Money::from_minor(1050).format(Currency::Jpy), "¥1050");
        assert_eq!(Money::from_minor(-5).format(Currency::Usd), "-$0.05");
    }

    #[test]
    fn money_to_major_respects_exponent() {
        assert_eq!(Money::from_minor(2499).to_major(2), dec!(24.99));
        assert_eq!(Money::from_minor(2499).to_major(0), dec!(2499));
    }

    #[test]
    fn money_from_major_rounds_half_even() {
        assert_eq!(Money::from_major(dec!(10.125), 2).unwrap(), Money::from_minor(1012));
        assert_eq!(Money::from_major(dec!(10.135), 2).unwrap(), Money::from_minor(1014));
        assert_eq!(Money::from_major(dec!(24.99), 2).unwrap(), Money::from_minor(2499));
    }

    #[test]
    fn money_times_is_exact() {
        let line = Money::from_minor(2499).times(Quantity::new(2).unwrap()).unwrap();
        assert_eq!(line, Money::from_minor(4998));
    }

    #[test]
    fn money_apply_rate_rounds_once() {
        // 8497 * 0.08 = 679.76
        assert_eq!(
            Money::from_minor(8497).apply_rate(dec!(0.08)).unwrap(),
            Money::from_minor(680)
        );
        // 1250 * 0.05 = 62.5 -> 62 (half to even)
        assert_eq!(
            Money::from_minor(1250).apply_rate(dec!(0.05)).unwrap(),
            Money::from_minor(62)
        );
        // 1350 * 0.05 = 67.5 -> 68
        assert_eq!(
            Money::from_minor(1350).apply_rate(dec!(0.05)).unwrap(),
            Money::from_minor(68)
        );
    }

    #[test]
    fn money_average_over_zero_parts_is_zero() {
        assert_eq!(Money::from_minor(1000).average_over(0), Money::ZERO);
    }

    #[test]
    fn money_average_over_rounds_half_even() {
        // 5 / 2 = 2.5 -> 2
        assert_eq!(Money::from_minor(5).average_over(2), Money::from_minor(2));
        // 7 / 2 = 3.5 -> 4
        assert_eq!(Money::from_minor(7).average_over(2), Money::from_minor(4));
        assert_eq!(Money::from_minor(10).average_over(3), Money::from_minor(3));
    }

    #[test]
    fn money_checked_add_overflow() {
        let result = Money::from_minor(i64::MAX).checked_add(Money::from_minor(1));
        assert!(matches!(result, Err(DomainError::Overflow { .. })));
    }

    #[test]
    fn money_saturating_add_clamps() {
        assert_eq!(
            Money::from_minor(i64::MAX).saturating_add(Money::from_minor(5)),
            Money::from_minor(i64::MAX)
        );
    }

    #[test]
    fn money_checked_sum() {
        let total =
            Money::checked_sum([Money::from_minor(4998), Money::from_minor(3499)]).unwrap();
        assert_eq!(total, Money::from_minor(8497));
    }

    #[test]
    fn money_ordering_and_sign() {
        assert!(Money::from_minor(100) > Money::from_minor(50));
        assert!(Money::ZERO.is_zero());
        assert!(Money::from_minor(-1).is_negative());
        assert!(Money::from_minor(1).is_positive());
    }

    #[test]
    fn money_serde_is_minor_units() {
        let json = serde_json::to_string(&Money::from_minor(9677)).unwrap();
        assert_eq!(json, "9677");
        let parsed: Money = serde_json::from_str("9677").unwrap();
        assert_eq!(parsed, Money::from_minor(9677));
    }
}
