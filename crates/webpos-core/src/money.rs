//! # Money Module
//!
//! Provides the `Money` type for monetary values in integer minor units.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    price 1000 × qty 4 = 4000, exactly, every time                      │
//! │                                                                         │
//! │  Client-submitted totals are integers too; anything else is            │
//! │  rejected at deserialization.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Line arithmetic is checked: an overflowing sale is a validation failure,
//! never a wrapped total.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// A monetary value in the smallest currency unit.
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► SaleLine.unit_price ──► line total (× qty)
///                                                │
///                                                ▼
///                                  Σ line totals = Sale.subtotal
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use webpos_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(1500).minor(), 1500);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Price of `qty` units, or `None` on overflow.
    pub fn checked_mul_qty(self, qty: i64) -> Option<Money> {
        self.0.checked_mul(qty).map(Money)
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Sums an iterator of amounts, or `None` if any step overflows.
    pub fn checked_sum<I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, next| acc.checked_add(next))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Money {
    fn from(minor: i64) -> Self {
        Money(minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        let price = Money::from_minor(1000);
        assert_eq!(price.checked_mul_qty(4), Some(Money::from_minor(4000)));
    }

    #[test]
    fn test_line_total_overflow() {
        let price = Money::from_minor(i64::MAX / 2);
        assert_eq!(price.checked_mul_qty(3), None);
    }

    #[test]
    fn test_checked_sum() {
        let total = Money::checked_sum([1000, 250, 5].map(Money::from_minor));
        assert_eq!(total, Some(Money::from_minor(1255)));

        let overflow = Money::checked_sum([Money::from_minor(i64::MAX), Money::from_minor(1)]);
        assert_eq!(overflow, None);
    }

    #[test]
    fn test_checked_sum_empty_is_zero() {
        assert_eq!(Money::checked_sum(Vec::new()), Some(Money::zero()));
    }

    #[test]
    fn test_display_is_minor_units() {
        assert_eq!(Money::from_minor(4000).to_string(), "4000");
        assert!(Money::from_minor(-1).is_negative());
    }
}
