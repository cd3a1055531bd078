//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (kopecks, cents)                     │
//! │    Product.price, Order.total, Promo.discount are all i64 cents         │
//! │                                                                         │
//! │  Decimal text only appears at the edges:                                │
//! │    • session discount string  ──► Money::parse_exact                    │
//! │    • statistics (mean, std)   ──► Money::to_decimal                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use zoo_core::money::Money;
//!
//! let price = Money::from_cents(1099);
//! let doubled = price * 2;
//! assert_eq!(doubled.cents(), 2198);
//!
//! let parsed = Money::parse_exact("5.00").unwrap();
//! assert_eq!(parsed, Money::from_cents(500));
//! ```

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit.
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  Product.price_cents ──► CartLine.line_total (live)                     │
/// │                    └───► OrderItem.price_cents (frozen at checkout)     │
/// │                                                                         │
/// │  Cart.total_price ──► Promo.calculate_discount ──► Order.total          │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use zoo_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(10, 50).cents(), 1050);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use zoo_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    ///
    /// Saturates at the `i64` bounds; use [`Money::checked_multiply_quantity`]
    /// where an overflow must be reported.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Multiplies money by a quantity, `None` on overflow.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Exact decimal representation with two fractional digits.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Converts a decimal amount into money.
    ///
    /// Returns `None` when the amount has digits below the minor unit
    /// (`5.001`) or does not fit in `i64` cents. Trailing zeros are fine:
    /// `5.000` is the same amount as `5.00`.
    pub fn from_decimal(amount: Decimal) -> Option<Self> {
        let amount = amount.normalize();
        if amount.scale() > 2 {
            return None;
        }
        amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Money)
    }

    /// Parses a decimal string such as `"5.00"` into money.
    ///
    /// ## Rules
    /// - Surrounding whitespace is ignored
    /// - Must be a plain decimal (`12`, `12.5`, `12.50`)
    /// - At most two significant fractional digits
    pub fn parse_exact(input: &str) -> Result<Self, ValidationError> {
        let amount = Decimal::from_str(input.trim()).map_err(|_| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{}' is not a decimal amount", input),
        })?;

        Money::from_decimal(amount).ok_or_else(|| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{}' has more precision than the currency allows", input),
        })
    }

    /// Formats the amount followed by a currency symbol, e.g. `25.00 Br`.
    pub fn format_with(&self, symbol: &str) -> String {
        format!("{} {}", self, symbol)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal text, the same form stored in the session (`"5.00"`).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
        assert_eq!(Money::from_cents(2500).format_with("Br"), "25.00 Br");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_quantity_overflow() {
        let price = Money::from_cents(299);
        assert_eq!(price.checked_multiply_quantity(3), Some(Money::from_cents(897)));
        assert_eq!(price.checked_multiply_quantity(i64::MAX), None);
        assert_eq!(price.multiply_quantity(i64::MAX).cents(), i64::MAX);

        let max = Money::from_cents(i64::MAX);
        assert_eq!(max.checked_add(Money::from_cents(1)), None);
        assert_eq!((max + Money::from_cents(1)).cents(), i64::MAX);
    }

    #[test]
    fn test_parse_exact_accepts_equivalent_forms() {
        assert_eq!(Money::parse_exact("5.00").unwrap().cents(), 500);
        assert_eq!(Money::parse_exact("5").unwrap().cents(), 500);
        assert_eq!(Money::parse_exact(" 5.5 ").unwrap().cents(), 550);
        assert_eq!(Money::parse_exact("5.000").unwrap().cents(), 500);
    }

    #[test]
    fn test_parse_exact_rejects_garbage_and_sub_cent() {
        assert!(Money::parse_exact("").is_err());
        assert!(Money::parse_exact("five").is_err());
        assert!(Money::parse_exact("5.001").is_err());
    }

    #[test]
    fn test_decimal_conversion() {
        let money = Money::from_cents(2550);
        assert_eq!(money.to_decimal().to_string(), "25.50");
        assert_eq!(Money::from_decimal(money.to_decimal()), Some(money));
    }
}
