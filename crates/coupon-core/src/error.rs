//! # Error Types
//!
//! Domain-specific error types for coupon-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  coupon-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  coupon-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  coupon-service errors (separate crate)                                │
//! │  └── ApiError         - What callers see (serialized taxonomy)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Caller       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (code, field, thresholds)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a caller-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations detected by the pure logic.
/// The service layer translates them into the external error taxonomy.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Coupon is not active.
    #[error("Coupon is not active")]
    CouponInactive,

    /// Coupon's validity window has not started.
    #[error("Coupon is not valid yet")]
    CouponNotYetValid,

    /// Coupon's validity window has ended.
    #[error("Coupon has expired")]
    CouponExpired,

    /// Coupon's usage cap has been reached.
    #[error("Coupon has reached its maximum number of uses")]
    CouponMaxUses,

    /// Cart total is below the coupon's minimum purchase threshold.
    ///
    /// A cart exactly equal to the threshold passes; rejection is strict
    /// less-than.
    #[error("Cart total {cart_total_cents} is below the minimum purchase of {required_cents}")]
    MinPurchaseNotMet {
        required_cents: i64,
        cart_total_cents: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a request doesn't meet structural or cross-field
/// requirements. They are produced before any store access.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., invalid characters in a code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Percentage discount exceeds 100, evaluated against the final merged
    /// value on updates.
    #[error("discountValue must be at most 100 when discountType is percentage (got {value})")]
    PercentageOutOfRange { value: i64 },

    /// validFrom is not strictly before validUntil, evaluated against the
    /// final merged values on updates.
    #[error("validFrom must be strictly before validUntil")]
    InvalidDateRange,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::MinPurchaseNotMet {
            required_cents: 5000,
            cart_total_cents: 1200,
        };
        assert_eq!(
            err.to_string(),
            "Cart total 1200 is below the minimum purchase of 5000"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "code".to_string(),
        };
        assert_eq!(err.to_string(), "code is required");

        let err = ValidationError::PercentageOutOfRange { value: 5000 };
        assert!(err.to_string().contains("at most 100"));
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::InvalidDateRange;
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
