//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A 10% discount computed in floats can disagree with the order          │
//! │  system by a cent - and financial rounding disagreements are a          │
//! │  classic integration bug.                                               │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Cart totals, minimum-purchase thresholds, and discount amounts       │
//! │    are all i64 cents. Percentage math uses one pinned rounding rule.    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding Rule
//! Percentage discounts round **half up**: `(cart * percent + 50) / 100`
//! in i128 to avoid overflow. The exact vectors are pinned in tests - do
//! not change the rule without changing every caller's expectations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate arithmetic may dip negative; the public
///   discount API clamps final totals at zero
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support, serialized as a bare integer
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use coupon_core::money::Money;
    ///
    /// let cart = Money::from_cents(50_000);
    /// assert_eq!(cart.cents(), 50_000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the smaller of two values.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    /// Computes a percentage of this amount, rounding half up.
    ///
    /// ## Implementation
    /// Integer math in i128: `(amount * percent + 50) / 100`. The `+50`
    /// provides the half-up rounding (50/100 = 0.5). This is the same
    /// integer rounding idiom used for basis-point tax math, scaled to
    /// whole percent.
    ///
    /// ## Example
    /// ```rust
    /// use coupon_core::money::Money;
    ///
    /// let cart = Money::from_cents(50_000);
    /// assert_eq!(cart.percentage(10).cents(), 5_000);
    ///
    /// // Half-up: 1.5 cents rounds to 2
    /// let odd = Money::from_cents(15);
    /// assert_eq!(odd.percentage(10).cents(), 2);
    /// ```
    pub fn percentage(&self, percent: i64) -> Money {
        // i128 prevents overflow on large carts
        let cents = (self.0 as i128 * percent as i128 + 50) / 100;
        Money::from_cents(cents as i64)
    }

    /// Subtracts `other`, clamping the result at zero.
    ///
    /// ## Why Clamp?
    /// A discount never produces a negative total. Both discount kinds are
    /// capped at the cart total by construction, so this is a safety net,
    /// not a normal code path.
    #[inline]
    pub fn saturating_sub_at_zero(self, other: Self) -> Self {
        Money((self.0 - other.0).max(0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. Callers format for display themselves
/// to handle currency and localization.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
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
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
    }

    #[test]
    fn test_percentage_exact() {
        // 10% of 50,000 = 5,000
        assert_eq!(Money::from_cents(50_000).percentage(10).cents(), 5_000);
        // 100% of anything is itself
        assert_eq!(Money::from_cents(777).percentage(100).cents(), 777);
        // 0-cent cart discounts to 0
        assert_eq!(Money::zero().percentage(50).cents(), 0);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 10% of 15 = 1.5 → 2 (half up)
        assert_eq!(Money::from_cents(15).percentage(10).cents(), 2);
        // 10% of 14 = 1.4 → 1
        assert_eq!(Money::from_cents(14).percentage(10).cents(), 1);
        // 25% of 10 = 2.5 → 3
        assert_eq!(Money::from_cents(10).percentage(25).cents(), 3);
        // 33% of 100 = 33 exactly
        assert_eq!(Money::from_cents(100).percentage(33).cents(), 33);
    }

    #[test]
    fn test_percentage_large_cart_no_overflow() {
        // A cart near i64::MAX/100 would overflow without i128
        let huge = Money::from_cents(1_000_000_000_000);
        assert_eq!(huge.percentage(10).cents(), 100_000_000_000);
    }

    #[test]
    fn test_saturating_sub_at_zero() {
        let cart = Money::from_cents(10_000);
        assert_eq!(cart.saturating_sub_at_zero(Money::from_cents(4_000)).cents(), 6_000);
        assert_eq!(cart.saturating_sub_at_zero(Money::from_cents(50_000)).cents(), 0);
    }

    #[test]
    fn test_min() {
        let a = Money::from_cents(5_000);
        let b = Money::from_cents(10_000);
        assert_eq!(a.min(b).cents(), 5_000);
        assert_eq!(b.min(a).cents(), 5_000);
    }
}
