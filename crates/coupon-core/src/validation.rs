//! # Validation Module
//!
//! Structural and cross-field validation for coupon requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Structural (THIS MODULE, schema-level)                       │
//! │  ├── Required fields present, positive numbers, code format            │
//! │  └── Cross-field checks when BOTH halves are in the same request       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Merged-value checks (THIS MODULE, handler-level)             │
//! │  ├── For partial updates the schema cannot see stored state, so        │
//! │  │   percentage<=100 and validFrom<validUntil are re-evaluated         │
//! │  └── against the FINAL merged values (new if provided, else stored)    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints on values                                       │
//! │  └── UNIQUE (site_id, code) backstop                                   │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure here happens before any store access.

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::types::DiscountType;
use crate::{MAX_CODE_LENGTH, MAX_PERCENTAGE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates an opaque identifier (site id, coupon id, order id).
///
/// ## Rules
/// - Must not be empty or whitespace-only
///
/// Identifiers are store-assigned and opaque; the only structural
/// requirement is presence.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Coupon Field Validators
// =============================================================================

/// Validates a coupon code.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - May contain letters, numbers, hyphens, and underscores
///
/// Case is irrelevant here; normalization to uppercase happens at every
/// write and comparison, not in validation.
///
/// ## Example
/// ```rust
/// use coupon_core::validation::validate_code;
///
/// assert!(validate_code("SUMMER10").is_ok());
/// assert!(validate_code("summer10").is_ok());
/// assert!(validate_code("").is_err());
/// assert!(validate_code("HAS SPACE").is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > MAX_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LENGTH,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a discount value against its kind.
///
/// ## Rules
/// - Must be positive for both kinds
/// - Must be at most 100 when the kind is percentage
pub fn validate_discount(kind: DiscountType, value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "discountValue".to_string(),
        });
    }

    if kind == DiscountType::Percentage && value > MAX_PERCENTAGE {
        return Err(ValidationError::PercentageOutOfRange { value });
    }

    Ok(())
}

/// Validates an optional positive field (minPurchase, maxUses).
///
/// `None` means the limit is absent and is always fine; a present value
/// must be positive.
pub fn validate_optional_positive(field: &str, value: Option<i64>) -> ValidationResult<()> {
    if let Some(v) = value {
        if v <= 0 {
            return Err(ValidationError::MustBePositive {
                field: field.to_string(),
            });
        }
    }

    Ok(())
}

/// Validates that a validity window is ordered: validFrom strictly before
/// validUntil.
pub fn validate_date_range(
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
) -> ValidationResult<()> {
    if valid_from >= valid_until {
        return Err(ValidationError::InvalidDateRange);
    }

    Ok(())
}

/// Validates a cart total.
///
/// ## Rules
/// - Must be non-negative (zero carts are allowed; discounts floor at zero)
pub fn validate_cart_total(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "cartTotal".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Cross-Field Validators
// =============================================================================

/// Schema-level cross-field checks for update requests.
///
/// Applies a comparison **only when both halves are present in the same
/// request**. When only one side is supplied the comparison is deferred to
/// [`validate_merged`], which the handler runs against stored state - the
/// schema cannot see the database.
pub fn validate_update_cross_fields(
    discount_type: Option<DiscountType>,
    discount_value: Option<i64>,
    valid_from: Option<DateTime<Utc>>,
    valid_until: Option<DateTime<Utc>>,
) -> ValidationResult<()> {
    if let (Some(kind), Some(value)) = (discount_type, discount_value) {
        validate_discount(kind, value)?;
    } else if let Some(value) = discount_value {
        // Kind unknown at schema level; only positivity can be checked here
        if value <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "discountValue".to_string(),
            });
        }
    }

    if let (Some(from), Some(until)) = (valid_from, valid_until) {
        validate_date_range(from, until)?;
    }

    Ok(())
}

/// Handler-level check of the invariants against the FINAL merged values:
/// the new value where the request provided one, the stored value otherwise.
///
/// This is the second stage of the two-stage deferral: a request updating
/// only `discountType` to percentage must still be rejected when the stored
/// `discountValue` is 5000.
pub fn validate_merged(
    merged_type: DiscountType,
    merged_value: i64,
    merged_from: DateTime<Utc>,
    merged_until: DateTime<Utc>,
) -> ValidationResult<()> {
    validate_discount(merged_type, merged_value)?;
    validate_date_range(merged_from, merged_until)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_validate_id() {
        assert!(validate_id("siteId", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_id("siteId", "").is_err());
        assert!(validate_id("siteId", "   ").is_err());
    }

    #[test]
    fn test_validate_code() {
        assert!(validate_code("SUMMER10").is_ok());
        assert!(validate_code("spring-sale_2").is_ok());

        assert!(validate_code("").is_err());
        assert!(validate_code("   ").is_err());
        assert!(validate_code("HAS SPACE").is_err());
        assert!(validate_code(&"A".repeat(60)).is_err());
    }

    #[test]
    fn test_validate_discount_percentage() {
        assert!(validate_discount(DiscountType::Percentage, 10).is_ok());
        assert!(validate_discount(DiscountType::Percentage, 100).is_ok());

        assert!(validate_discount(DiscountType::Percentage, 0).is_err());
        assert!(validate_discount(DiscountType::Percentage, -5).is_err());
        assert!(matches!(
            validate_discount(DiscountType::Percentage, 101),
            Err(ValidationError::PercentageOutOfRange { value: 101 })
        ));
    }

    #[test]
    fn test_validate_discount_fixed_unbounded_above() {
        // Fixed discounts have no upper bound at validation time; they are
        // capped at the cart total when applied
        assert!(validate_discount(DiscountType::Fixed, 1_000_000).is_ok());
        assert!(validate_discount(DiscountType::Fixed, 0).is_err());
    }

    #[test]
    fn test_validate_optional_positive() {
        assert!(validate_optional_positive("maxUses", None).is_ok());
        assert!(validate_optional_positive("maxUses", Some(1)).is_ok());
        assert!(validate_optional_positive("maxUses", Some(0)).is_err());
        assert!(validate_optional_positive("minPurchase", Some(-10)).is_err());
    }

    #[test]
    fn test_validate_date_range() {
        let now = Utc::now();
        assert!(validate_date_range(now, now + Duration::days(1)).is_ok());
        assert!(validate_date_range(now, now).is_err());
        assert!(validate_date_range(now + Duration::days(1), now).is_err());
    }

    #[test]
    fn test_validate_cart_total() {
        assert!(validate_cart_total(0).is_ok());
        assert!(validate_cart_total(50_000).is_ok());
        assert!(validate_cart_total(-1).is_err());
    }

    #[test]
    fn test_cross_fields_both_present() {
        assert!(validate_update_cross_fields(
            Some(DiscountType::Percentage),
            Some(150),
            None,
            None
        )
        .is_err());

        assert!(validate_update_cross_fields(
            Some(DiscountType::Fixed),
            Some(150),
            None,
            None
        )
        .is_ok());
    }

    #[test]
    fn test_cross_fields_one_side_deferred() {
        // Only discountType supplied: comparison deferred to merged check
        assert!(
            validate_update_cross_fields(Some(DiscountType::Percentage), None, None, None).is_ok()
        );
        // Only one date supplied: ordering deferred to merged check
        let now = Utc::now();
        assert!(validate_update_cross_fields(None, None, Some(now), None).is_ok());
        assert!(validate_update_cross_fields(None, None, None, Some(now)).is_ok());
    }

    #[test]
    fn test_cross_fields_value_alone_still_positive() {
        assert!(validate_update_cross_fields(None, Some(-1), None, None).is_err());
        // A large value alone passes the schema; the merged check decides
        assert!(validate_update_cross_fields(None, Some(5000), None, None).is_ok());
    }

    #[test]
    fn test_validate_merged_catches_stored_conflict() {
        let now = Utc::now();
        // Switching a stored fixed-5000 coupon to percentage must fail
        assert!(matches!(
            validate_merged(
                DiscountType::Percentage,
                5000,
                now,
                now + Duration::days(1)
            ),
            Err(ValidationError::PercentageOutOfRange { value: 5000 })
        ));

        // Moving validFrom past the stored validUntil must fail
        assert!(matches!(
            validate_merged(DiscountType::Fixed, 100, now + Duration::days(2), now),
            Err(ValidationError::InvalidDateRange)
        ));
    }
}
