//! # Eligibility Engine
//!
//! The pure decision function at the heart of the service: given a coupon
//! snapshot, a cart total, and the current time, decide whether the coupon
//! may be redeemed and what it is worth.
//!
//! ## Check Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Eligibility Decision Order                           │
//! │                                                                         │
//! │  1. is_active?          ── no ──► Inactive                             │
//! │  2. now >= valid_from?  ── no ──► NotYetValid                          │
//! │  3. now <= valid_until? ── no ──► Expired   (upper bound INCLUSIVE)    │
//! │  4. used < max_uses?    ── no ──► MaxUsesReached  (if max_uses set)    │
//! │  5. cart >= minimum?    ── no ──► MinPurchaseNotMet (if minimum set)   │
//! │          │                                                              │
//! │          ▼                                                              │
//! │     Eligible ──► compute_discount                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The order is part of the contract: each failure maps to a distinct
//! externally-visible error code and callers rely on the first reported
//! reason, so the checks short-circuit top to bottom.
//!
//! The engine never mutates anything. The coupon's stored state only changes
//! through the redemption counter in coupon-db.

use chrono::{DateTime, Utc};

use crate::money::Money;
use crate::types::{Coupon, DiscountType};

// =============================================================================
// Ineligibility
// =============================================================================

/// The first reason a coupon cannot be redeemed, in check order.
///
/// This is a pure classification of the snapshot at evaluation time; there
/// are no transitions here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    /// The coupon's active flag is false.
    Inactive,
    /// The validity window has not started.
    NotYetValid,
    /// The validity window has ended (`now > valid_until`).
    Expired,
    /// `used_count` has reached `max_uses`.
    MaxUsesReached,
    /// The cart total is strictly below the minimum purchase threshold.
    MinPurchaseNotMet {
        required_cents: i64,
        cart_total_cents: i64,
    },
}

// =============================================================================
// Eligibility Check
// =============================================================================

/// Decides whether `coupon` may be redeemed against a cart of `cart_total`
/// at time `now`.
///
/// ## Boundary Semantics
/// - `now == valid_from` is valid (inclusive start)
/// - `now == valid_until` is valid (inclusive end)
/// - `cart_total == min_purchase` passes (rejection is strict less-than)
///
/// ## Example
/// ```rust
/// use coupon_core::eligibility::{check_eligibility, Ineligibility};
/// # use coupon_core::types::{Coupon, DiscountType};
/// # use coupon_core::money::Money;
/// # use chrono::{Duration, Utc};
/// # let now = Utc::now();
/// # let coupon = Coupon {
/// #     id: "c".into(), site_id: "s".into(), user_id: "u".into(),
/// #     code: "X".into(), discount_type: DiscountType::Fixed,
/// #     discount_value: 100, min_purchase_cents: None, max_uses: Some(1),
/// #     used_count: 1, valid_from: now - Duration::days(1),
/// #     valid_until: now + Duration::days(1), is_active: true,
/// #     created_at: now, updated_at: now,
/// # };
/// let verdict = check_eligibility(&coupon, Money::from_cents(1000), now);
/// assert_eq!(verdict, Err(Ineligibility::MaxUsesReached));
/// ```
pub fn check_eligibility(
    coupon: &Coupon,
    cart_total: Money,
    now: DateTime<Utc>,
) -> Result<(), Ineligibility> {
    if !coupon.is_active {
        return Err(Ineligibility::Inactive);
    }

    if now < coupon.valid_from {
        return Err(Ineligibility::NotYetValid);
    }

    if now > coupon.valid_until {
        return Err(Ineligibility::Expired);
    }

    if coupon.uses_exhausted() {
        return Err(Ineligibility::MaxUsesReached);
    }

    if let Some(minimum) = coupon.min_purchase() {
        // Strict less-than rejection: equality passes
        if cart_total < minimum {
            return Err(Ineligibility::MinPurchaseNotMet {
                required_cents: minimum.cents(),
                cart_total_cents: cart_total.cents(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Discount Computation
// =============================================================================

/// The discount breakdown for an eligible coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discount {
    /// Amount taken off the cart, in cents. Never exceeds the cart total.
    pub discount_amount: Money,
    /// Cart total after the discount. Never negative.
    pub final_total: Money,
}

/// Computes the discount an eligible coupon grants against `cart_total`.
///
/// - `Percentage`: `round_half_up(cart * value / 100)`
/// - `Fixed`: `min(value, cart)` - the discount never exceeds the cart
///
/// `final_total` is floored at zero; by construction both kinds already
/// keep the discount within the cart total, so the floor is a safety net,
/// not a normal path.
pub fn compute_discount(kind: DiscountType, value: i64, cart_total: Money) -> Discount {
    let discount_amount = match kind {
        DiscountType::Percentage => cart_total.percentage(value),
        DiscountType::Fixed => Money::from_cents(value).min(cart_total),
    };

    Discount {
        discount_amount,
        final_total: cart_total.saturating_sub_at_zero(discount_amount),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn coupon(now: DateTime<Utc>) -> Coupon {
        Coupon {
            id: "c-1".to_string(),
            site_id: "s-1".to_string(),
            user_id: "u-1".to_string(),
            code: "SAVE10".to_string(),
            discount_type: DiscountType::Percentage,
            discount_value: 10,
            min_purchase_cents: None,
            max_uses: None,
            used_count: 0,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_eligible_coupon_passes() {
        let now = Utc::now();
        let c = coupon(now);
        assert_eq!(check_eligibility(&c, Money::from_cents(1000), now), Ok(()));
    }

    #[test]
    fn test_inactive_checked_first() {
        let now = Utc::now();
        let mut c = coupon(now);
        c.is_active = false;
        // Also expired and exhausted - inactive must win
        c.valid_until = now - Duration::days(2);
        c.max_uses = Some(1);
        c.used_count = 1;
        assert_eq!(
            check_eligibility(&c, Money::from_cents(1000), now),
            Err(Ineligibility::Inactive)
        );
    }

    #[test]
    fn test_not_yet_valid() {
        let now = Utc::now();
        let mut c = coupon(now);
        c.valid_from = now + Duration::hours(1);
        assert_eq!(
            check_eligibility(&c, Money::from_cents(1000), now),
            Err(Ineligibility::NotYetValid)
        );
    }

    #[test]
    fn test_valid_from_boundary_inclusive() {
        let now = Utc::now();
        let mut c = coupon(now);
        c.valid_from = now;
        assert_eq!(check_eligibility(&c, Money::from_cents(1000), now), Ok(()));
    }

    #[test]
    fn test_expired() {
        let now = Utc::now();
        let mut c = coupon(now);
        c.valid_until = now - Duration::seconds(1);
        assert_eq!(
            check_eligibility(&c, Money::from_cents(1000), now),
            Err(Ineligibility::Expired)
        );
    }

    #[test]
    fn test_valid_until_boundary_inclusive() {
        // Exactly-equal to valid_until is still valid
        let now = Utc::now();
        let mut c = coupon(now);
        c.valid_until = now;
        assert_eq!(check_eligibility(&c, Money::from_cents(1000), now), Ok(()));
    }

    #[test]
    fn test_max_uses_reached() {
        let now = Utc::now();
        let mut c = coupon(now);
        c.max_uses = Some(3);
        c.used_count = 3;
        assert_eq!(
            check_eligibility(&c, Money::from_cents(1000), now),
            Err(Ineligibility::MaxUsesReached)
        );
    }

    #[test]
    fn test_max_uses_under_cap_passes() {
        let now = Utc::now();
        let mut c = coupon(now);
        c.max_uses = Some(3);
        c.used_count = 2;
        assert_eq!(check_eligibility(&c, Money::from_cents(1000), now), Ok(()));
    }

    #[test]
    fn test_min_purchase_strict_rejection() {
        let now = Utc::now();
        let mut c = coupon(now);
        c.min_purchase_cents = Some(5000);

        assert_eq!(
            check_eligibility(&c, Money::from_cents(4999), now),
            Err(Ineligibility::MinPurchaseNotMet {
                required_cents: 5000,
                cart_total_cents: 4999,
            })
        );
        // Exactly equal passes
        assert_eq!(check_eligibility(&c, Money::from_cents(5000), now), Ok(()));
    }

    #[test]
    fn test_check_order_max_uses_before_min_purchase() {
        let now = Utc::now();
        let mut c = coupon(now);
        c.max_uses = Some(1);
        c.used_count = 1;
        c.min_purchase_cents = Some(5000);
        assert_eq!(
            check_eligibility(&c, Money::from_cents(1), now),
            Err(Ineligibility::MaxUsesReached)
        );
    }

    // Discount vectors pinned by the external contract

    #[test]
    fn test_percentage_discount_vector() {
        // percentage 10 on 50,000 → 5,000 off, 45,000 final
        let d = compute_discount(DiscountType::Percentage, 10, Money::from_cents(50_000));
        assert_eq!(d.discount_amount.cents(), 5_000);
        assert_eq!(d.final_total.cents(), 45_000);
    }

    #[test]
    fn test_fixed_discount_vector() {
        // fixed 5,000 on 50,000 → 5,000 off, 45,000 final
        let d = compute_discount(DiscountType::Fixed, 5_000, Money::from_cents(50_000));
        assert_eq!(d.discount_amount.cents(), 5_000);
        assert_eq!(d.final_total.cents(), 45_000);
    }

    #[test]
    fn test_fixed_discount_capped_at_cart() {
        // fixed 50,000 on 10,000 → capped at 10,000, final 0
        let d = compute_discount(DiscountType::Fixed, 50_000, Money::from_cents(10_000));
        assert_eq!(d.discount_amount.cents(), 10_000);
        assert_eq!(d.final_total.cents(), 0);
    }

    #[test]
    fn test_percentage_rounding_half_up() {
        // 10% of 15 cents = 1.5 → 2
        let d = compute_discount(DiscountType::Percentage, 10, Money::from_cents(15));
        assert_eq!(d.discount_amount.cents(), 2);
        assert_eq!(d.final_total.cents(), 13);
    }

    #[test]
    fn test_zero_cart() {
        let d = compute_discount(DiscountType::Percentage, 50, Money::zero());
        assert_eq!(d.discount_amount.cents(), 0);
        assert_eq!(d.final_total.cents(), 0);

        let d = compute_discount(DiscountType::Fixed, 1000, Money::zero());
        assert_eq!(d.discount_amount.cents(), 0);
        assert_eq!(d.final_total.cents(), 0);
    }
}
