//! # API Error Type
//!
//! The caller-facing error envelope and the full error-code taxonomy.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Flow                                      │
//! │                                                                         │
//! │  ValidationError ──────────────► INVALID_INPUT                         │
//! │  Ineligibility ────────────────► COUPON_INACTIVE / COUPON_EXPIRED /    │
//! │                                  COUPON_NOT_YET_VALID / COUPON_MAX_    │
//! │                                  USES / MIN_PURCHASE_NOT_MET           │
//! │  Guard failures ───────────────► SITE_NOT_FOUND / COUPON_NOT_FOUND /   │
//! │                                  FORBIDDEN                             │
//! │  Uniqueness / quota ───────────► DUPLICATE_CODE / COUPON_LIMIT_REACHED │
//! │  DbError (unexpected) ─────────► logged server-side, then              │
//! │                                  INTERNAL_ERROR with no detail leaked  │
//! │                                                                         │
//! │  Every domain failure is reported precisely - never collapsed into    │
//! │  INTERNAL_ERROR. Domain errors are terminal for the request;           │
//! │  INTERNAL_ERROR is retry-safe (the redemption increment is atomic:     │
//! │  it either fully committed or not at all).                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use coupon_core::{CoreError, Ineligibility, ValidationError};
use coupon_db::DbError;

/// API error returned from coupon operations.
///
/// ## Serialization
/// ```json
/// {
///   "code": "MIN_PURCHASE_NOT_MET",
///   "message": "Cart total 1200 is below the minimum purchase of 5000",
///   "details": { "requiredCents": 5000, "cartTotalCents": 1200 }
/// }
/// ```
#[derive(Debug, Clone, Error, Serialize)]
#[error("[{code:?}] {message}")]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Optional structured payload (thresholds, counts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// The complete error-code taxonomy of the service.
///
/// Serialized SCREAMING_SNAKE_CASE; these strings are the external
/// contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed or out-of-range request, caught before any store access
    InvalidInput,

    /// The requested site does not exist
    SiteNotFound,

    /// The requested coupon does not exist (in the requested site's scope)
    CouponNotFound,

    /// Cross-tenant access attempt: coupon exists but belongs to another site
    Forbidden,

    /// Coupon code already in use on this site
    DuplicateCode,

    /// The site owner's plan does not allow more coupons
    CouponLimitReached,

    /// Coupon's active flag is false
    CouponInactive,

    /// Coupon's validity window has ended
    CouponExpired,

    /// Coupon's validity window has not started
    CouponNotYetValid,

    /// Coupon's usage cap has been reached
    CouponMaxUses,

    /// Cart total is below the coupon's minimum purchase
    MinPurchaseNotMet,

    /// Unexpected failure (store unavailable, data corruption). Safe to
    /// retry; no detail leaked
    InternalError,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attaches a structured details payload.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Creates an INVALID_INPUT error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidInput, message)
    }

    /// Creates a SITE_NOT_FOUND error.
    pub fn site_not_found(site_id: &str) -> Self {
        ApiError::new(ErrorCode::SiteNotFound, format!("Site not found: {}", site_id))
    }

    /// Creates a COUPON_NOT_FOUND error.
    pub fn coupon_not_found(id_or_code: &str) -> Self {
        ApiError::new(
            ErrorCode::CouponNotFound,
            format!("Coupon not found: {}", id_or_code),
        )
    }

    /// Creates a FORBIDDEN error. Deliberately does not say which site the
    /// coupon actually belongs to.
    pub fn forbidden() -> Self {
        ApiError::new(
            ErrorCode::Forbidden,
            "Coupon does not belong to the requested site",
        )
    }

    /// Creates a DUPLICATE_CODE error.
    pub fn duplicate_code(code: &str) -> Self {
        ApiError::new(
            ErrorCode::DuplicateCode,
            format!("Coupon code '{}' already exists on this site", code),
        )
    }

    /// Creates an INTERNAL_ERROR. The real cause must already have been
    /// logged by the caller; nothing internal leaks here.
    pub fn internal() -> Self {
        ApiError::new(ErrorCode::InternalError, "An internal error occurred")
    }
}

/// Converts validation errors to INVALID_INPUT.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::invalid_input(err.to_string())
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CouponInactive => ApiError::new(ErrorCode::CouponInactive, err.to_string()),
            CoreError::CouponNotYetValid => {
                ApiError::new(ErrorCode::CouponNotYetValid, err.to_string())
            }
            CoreError::CouponExpired => ApiError::new(ErrorCode::CouponExpired, err.to_string()),
            CoreError::CouponMaxUses => ApiError::new(ErrorCode::CouponMaxUses, err.to_string()),
            CoreError::MinPurchaseNotMet { .. } => {
                ApiError::new(ErrorCode::MinPurchaseNotMet, err.to_string())
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

/// Converts an eligibility verdict into the matching taxonomy entry.
impl From<Ineligibility> for ApiError {
    fn from(reason: Ineligibility) -> Self {
        match reason {
            Ineligibility::Inactive => {
                ApiError::new(ErrorCode::CouponInactive, "Coupon is not active")
            }
            Ineligibility::NotYetValid => {
                ApiError::new(ErrorCode::CouponNotYetValid, "Coupon is not valid yet")
            }
            Ineligibility::Expired => ApiError::new(ErrorCode::CouponExpired, "Coupon has expired"),
            Ineligibility::MaxUsesReached => ApiError::new(
                ErrorCode::CouponMaxUses,
                "Coupon has reached its maximum number of uses",
            ),
            Ineligibility::MinPurchaseNotMet {
                required_cents,
                cart_total_cents,
            } => ApiError::new(
                ErrorCode::MinPurchaseNotMet,
                format!(
                    "Cart total {} is below the minimum purchase of {}",
                    cart_total_cents, required_cents
                ),
            )
            .with_details(serde_json::json!({
                "requiredCents": required_cents,
                "cartTotalCents": cart_total_cents,
            })),
        }
    }
}

/// Converts database errors to API errors.
///
/// Domain-meaningful store failures map precisely; everything else is
/// logged with full detail and surfaced as a generic INTERNAL_ERROR.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::new(
                ErrorCode::CouponNotFound,
                format!("{} not found: {}", entity, id),
            ),
            DbError::UniqueViolation { field, .. } => {
                // The (site_id, code) index is the only unique constraint
                ApiError::new(
                    ErrorCode::DuplicateCode,
                    format!("Duplicate value for {}", field),
                )
            }
            other => {
                tracing::error!(error = %other, "Unexpected database error");
                ApiError::internal()
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_wire_format() {
        // These strings are the external contract
        let cases = [
            (ErrorCode::InvalidInput, "\"INVALID_INPUT\""),
            (ErrorCode::SiteNotFound, "\"SITE_NOT_FOUND\""),
            (ErrorCode::CouponNotFound, "\"COUPON_NOT_FOUND\""),
            (ErrorCode::Forbidden, "\"FORBIDDEN\""),
            (ErrorCode::DuplicateCode, "\"DUPLICATE_CODE\""),
            (ErrorCode::CouponLimitReached, "\"COUPON_LIMIT_REACHED\""),
            (ErrorCode::CouponInactive, "\"COUPON_INACTIVE\""),
            (ErrorCode::CouponExpired, "\"COUPON_EXPIRED\""),
            (ErrorCode::CouponNotYetValid, "\"COUPON_NOT_YET_VALID\""),
            (ErrorCode::CouponMaxUses, "\"COUPON_MAX_USES\""),
            (ErrorCode::MinPurchaseNotMet, "\"MIN_PURCHASE_NOT_MET\""),
            (ErrorCode::InternalError, "\"INTERNAL_ERROR\""),
        ];
        for (code, expected) in cases {
            assert_eq!(serde_json::to_string(&code).unwrap(), expected);
        }
    }

    #[test]
    fn test_ineligibility_mapping_carries_details() {
        let err: ApiError = Ineligibility::MinPurchaseNotMet {
            required_cents: 5000,
            cart_total_cents: 1200,
        }
        .into();
        assert_eq!(err.code, ErrorCode::MinPurchaseNotMet);
        let details = err.details.unwrap();
        assert_eq!(details["requiredCents"], 5000);
        assert_eq!(details["cartTotalCents"], 1200);
    }

    #[test]
    fn test_unique_violation_maps_to_duplicate_code() {
        let err: ApiError = DbError::duplicate("coupons.code", "SAVE10").into();
        assert_eq!(err.code, ErrorCode::DuplicateCode);
    }

    #[test]
    fn test_internal_error_leaks_nothing() {
        let err: ApiError = DbError::QueryFailed("secret table layout".to_string()).into();
        assert_eq!(err.code, ErrorCode::InternalError);
        assert!(!err.message.contains("secret"));
    }
}
