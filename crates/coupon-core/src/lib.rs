//! # coupon-core: Pure Business Logic for the Coupon Service
//!
//! This crate is the **heart** of the coupon service. It contains the
//! eligibility engine, discount math, and request validation as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Coupon Service Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  coupon-service (operations)                    │   │
//! │  │   create ── list ── update ── delete ── validate ── apply      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ coupon-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌─────────────┐  ┌──────────┐ │   │
//! │  │   │   types   │  │   money   │  │ eligibility │  │validation│ │   │
//! │  │   │  Coupon   │  │   Money   │  │   rules     │  │  checks  │ │   │
//! │  │   │  Patch<T> │  │ rounding  │  │  discounts  │  │ schemas  │ │   │
//! │  │   └───────────┘  └───────────┘  └─────────────┘  └──────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   coupon-db (Database Layer)                    │   │
//! │  │           SQLite queries, migrations, redemption counter        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Coupon, Site, DiscountType, Patch)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`eligibility`] - The eligibility engine and discount computation
//! - [`validation`] - Structural and cross-field request validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use coupon_core::money::Money;
//! use coupon_core::types::DiscountType;
//! use coupon_core::eligibility::compute_discount;
//!
//! // 10% off a 50,000-cent cart = 5,000 cents
//! let d = compute_discount(DiscountType::Percentage, 10, Money::from_cents(50_000));
//! assert_eq!(d.discount_amount.cents(), 5_000);
//! assert_eq!(d.final_total.cents(), 45_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod eligibility;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use coupon_core::Coupon` instead of
// `use coupon_core::types::Coupon`

pub use eligibility::{check_eligibility, compute_discount, Discount, Ineligibility};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length accepted for a coupon code.
///
/// ## Business Reason
/// Codes are typed or pasted at checkout; anything longer than this is
/// either a data-entry mistake or abuse.
pub const MAX_CODE_LENGTH: usize = 50;

/// Maximum discount value for percentage coupons (whole percent).
pub const MAX_PERCENTAGE: i64 = 100;
