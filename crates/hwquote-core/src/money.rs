//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Fixed-Point Decimals?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │    (33 + 6.6) * 0.13 = 5.148000000000001                               │
//! │                                                                         │
//! │  Quotes need more than cents:                                           │
//! │    tax on 39.60 at 13% = 5.148, and the quote total must be            │
//! │    exactly subtotal + profit + tax = 44.748                            │
//! │                                                                         │
//! │  OUR SOLUTION: 96-bit decimal (rust_decimal)                            │
//! │    Every intermediate value is exact. Rounding to cents only           │
//! │    happens at display time, and it is Bankers Rounding.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use hwquote_core::money::Money;
//! use rust_decimal::Decimal;
//!
//! let unit_cost = Money::from_cents(1050); // 10.50
//! let line = unit_cost.multiply_quantity(3);
//! assert_eq!(line.amount(), Decimal::new(3150, 2));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::Rate;

// =============================================================================
// Money Type
// =============================================================================

/// An exact monetary amount in the quote currency.
///
/// ## Design Decisions
/// - **Decimal, not cents**: quotes carry sub-cent intermediate values
///   (tax of 5.148) that must add up exactly
/// - **Signed**: negative costs are accepted and flow through the formulas
/// - **Transparent serde**: reads `10`, `10.5` or `"10.50"` from JSON and
///   writes the normalized string (`"44.748"`, never `"44.7480"`)
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  ItemRecord.unit_material_cost ──► material_total ──► subtotal          │
/// │                                                          │              │
/// │  BOM line costs ──► CostSummary.subtotal ──► total_cost ──► final price │
/// │                                                                         │
/// │  EVERY monetary value in the system flows through this type            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Wraps an exact decimal amount.
    #[inline]
    pub const fn from_decimal(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from cents (the smallest display unit).
    ///
    /// ## Example
    /// ```rust
    /// use hwquote_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.to_string(), "10.99");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Returns the exact decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero (at any scale: `0.000 == 0`).
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a whole quantity.
    ///
    /// ## Example
    /// ```rust
    /// use hwquote_core::money::Money;
    ///
    /// let unit = Money::from_cents(299);
    /// assert_eq!(unit.multiply_quantity(3), Money::from_cents(897));
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: u64) -> Self {
        Money(self.0 * Decimal::from(qty))
    }

    /// Multiplies money by a fractional factor (kg, minutes, `1 + waste`).
    #[inline]
    pub fn scale(&self, factor: Decimal) -> Self {
        Money(self.0 * factor)
    }

    /// Returns `self × rate`, exactly.
    ///
    /// ## Example
    /// ```rust
    /// use hwquote_core::money::Money;
    /// use hwquote_core::types::Rate;
    /// use rust_decimal::Decimal;
    ///
    /// let base = Money::from_decimal(Decimal::new(396, 1)); // 39.6
    /// let tax = base.apply_rate(Rate::from_bps(1300));      // 13%
    /// assert_eq!(tax.amount(), Decimal::new(5148, 3));      // 5.148
    /// ```
    #[inline]
    pub fn apply_rate(&self, rate: Rate) -> Money {
        Money(self.0 * rate.ratio())
    }

    /// Rounds to cents using Bankers Rounding (round half to even).
    ///
    /// ```text
    /// 0.125 → 0.12    0.135 → 0.14    5.148 → 5.15
    /// ```
    ///
    /// Only used for display; stored amounts stay exact.
    pub fn round_cents(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven),
        )
    }

    /// Adds, clamping at the ends of the decimal range instead of panicking.
    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }
}

/// Formats an amount for summaries: currency code, thousands separators,
/// exactly two decimals.
///
/// ## Example
/// ```rust
/// use hwquote_core::money::{format_currency, Money};
///
/// assert_eq!(format_currency(Money::from_cents(123456789), "USD"), "USD 1,234,567.89");
/// ```
pub fn format_currency(value: Money, currency: &str) -> String {
    let rounded = value.round_cents().amount();
    let digits = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{} {}{}.{}", currency, sign, grouped, frac_part)
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the exact amount with trailing zeros removed (`44.748`, `20`).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Serialize::serialize(&self.0.normalize(), serializer)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a whole quantity.
impl Mul<u64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u64) -> Self {
        self.multiply_quantity(qty)
    }
}

/// Multiplication by a decimal factor.
impl Mul<Decimal> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, factor: Decimal) -> Self {
        self.scale(factor)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.amount(), dec!(10.99));
    }

    #[test]
    fn test_display_is_exact_and_normalized() {
        assert_eq!(Money::from_decimal(dec!(44.748)).to_string(), "44.748");
        assert_eq!(Money::from_decimal(dec!(20.00)).to_string(), "20");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.5");
    }

    #[test]
    fn test_serde_reads_numbers_and_writes_normalized_strings() {
        let money: Money = serde_json::from_str("10.50").unwrap();
        assert_eq!(money.amount(), dec!(10.5));

        let total = Money::from_decimal(dec!(44.7480));
        assert_eq!(serde_json::to_string(&total).unwrap(), "\"44.748\"");
    }

    #[test]
    fn test_decimal_arithmetic_is_exact() {
        let a = Money::from_decimal(dec!(0.1));
        let b = Money::from_decimal(dec!(0.2));
        assert_eq!(a + b, Money::from_decimal(dec!(0.3)));
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).amount(), dec!(15));
        assert_eq!((a - b).amount(), dec!(5));
        assert_eq!((a * 3u64).amount(), dec!(30));
        assert_eq!((a * dec!(1.5)).amount(), dec!(15));

        let mut c = a;
        c += b;
        c -= Money::from_cents(100);
        assert_eq!(c.amount(), dec!(14));
    }

    #[test]
    fn test_apply_rate() {
        let subtotal = Money::from_decimal(dec!(39.6));
        let tax = subtotal.apply_rate(Rate::from_ratio(dec!(0.13)));
        assert_eq!(tax.amount(), dec!(5.148));
    }

    #[test]
    fn test_round_cents_is_bankers() {
        assert_eq!(Money::from_decimal(dec!(0.125)).round_cents().amount(), dec!(0.12));
        assert_eq!(Money::from_decimal(dec!(0.135)).round_cents().amount(), dec!(0.14));
        assert_eq!(Money::from_decimal(dec!(5.148)).round_cents().amount(), dec!(5.15));
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        // Scale doesn't matter for zero
        assert!(Money::from_decimal(dec!(0.000)).is_zero());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs(), Money::from_cents(100));
    }

    #[test]
    fn test_sum() {
        let lines = vec![Money::from_cents(100), Money::from_cents(250), Money::from_cents(5)];
        let total: Money = lines.iter().sum();
        assert_eq!(total.amount(), dec!(3.55));
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Money::from_decimal(dec!(44.748)), "USD"), "USD 44.75");
        assert_eq!(format_currency(Money::from_cents(123456789), "CNY"), "CNY 1,234,567.89");
        assert_eq!(format_currency(Money::from_cents(100000), "USD"), "USD 1,000.00");
        assert_eq!(format_currency(Money::zero(), "USD"), "USD 0.00");
        assert_eq!(format_currency(Money::from_cents(-123456), "EUR"), "EUR -1,234.56");
    }

    #[test]
    fn test_deserializes_json_numbers_and_strings() {
        let from_int: Money = serde_json::from_str("10").unwrap();
        let from_float: Money = serde_json::from_str("0.13").unwrap();
        let from_str: Money = serde_json::from_str("\"7.25\"").unwrap();
        assert_eq!(from_int.amount(), dec!(10));
        assert_eq!(from_float.amount(), dec!(0.13));
        assert_eq!(from_str.amount(), dec!(7.25));
    }
}
