//! # Domain Types
//!
//! Core domain types used throughout the coupon service.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Coupon      │   │      Site       │   │  DiscountType   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  Percentage     │       │
//! │  │  site_id (FK)   │   │  user_id        │   │  Fixed          │       │
//! │  │  code (UPPER)   │   │  name           │   └─────────────────┘       │
//! │  │  used_count     │   └─────────────────┘                              │
//! │  │  valid window   │                                                    │
//! │  └─────────────────┘   ┌─────────────────┐                              │
//! │                        │    Patch<T>     │  three-state optional        │
//! │                        │  ─────────────  │  for partial updates:        │
//! │                        │  Absent         │  "leave unchanged"           │
//! │                        │  Null           │  "clear the field"           │
//! │                        │  Value(T)       │  "set to this"               │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tenant Isolation
//! Every coupon carries the `site_id` it belongs to and the `user_id` of the
//! site's owner (denormalized at create time, never settable by callers).
//! `site_id` is immutable after creation - ownership cannot move between
//! tenants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::money::Money;

// =============================================================================
// Discount Type
// =============================================================================

/// The kind of discount a coupon grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// A percentage of the cart total (value is whole percent, 1-100).
    Percentage,
    /// A fixed amount in cents, capped at the cart total.
    Fixed,
}

// =============================================================================
// Coupon
// =============================================================================

/// A discount policy owned by one tenant's site.
///
/// ## Invariants (enforced at every write)
/// - `code` is uppercase-normalized and unique within its site
/// - `discount_value <= 100` when `discount_type` is `Percentage`
/// - `valid_from < valid_until`
/// - `used_count <= max_uses` whenever `max_uses` is set; the redemption
///   counter is the sole writer of `used_count` and refuses to pass the cap
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Unique identifier (UUID v4), store-assigned.
    pub id: String,

    /// Site this coupon belongs to. Immutable after creation.
    pub site_id: String,

    /// Owner of the site, denormalized at create time. Not settable by callers.
    pub user_id: String,

    /// Coupon code, stored uppercase. Unique per site, not globally.
    pub code: String,

    /// Discount kind.
    pub discount_type: DiscountType,

    /// Discount value: whole percent for `Percentage`, cents for `Fixed`.
    pub discount_value: i64,

    /// Minimum cart total in cents required to redeem. None = no minimum.
    pub min_purchase_cents: Option<i64>,

    /// Maximum number of redemptions. None = unlimited.
    pub max_uses: Option<i64>,

    /// Number of completed redemptions. Monotonically non-decreasing.
    pub used_count: i64,

    /// Start of the validity window (inclusive).
    pub valid_from: DateTime<Utc>,

    /// End of the validity window (inclusive upper bound:
    /// `now == valid_until` is still valid).
    pub valid_until: DateTime<Utc>,

    /// Whether the coupon can currently be redeemed at all.
    pub is_active: bool,

    /// When the coupon was created.
    pub created_at: DateTime<Utc>,

    /// When the coupon was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    /// Returns the minimum purchase threshold as Money, if set.
    #[inline]
    pub fn min_purchase(&self) -> Option<Money> {
        self.min_purchase_cents.map(Money::from_cents)
    }

    /// Checks whether the usage cap has been reached.
    #[inline]
    pub fn uses_exhausted(&self) -> bool {
        match self.max_uses {
            Some(max) => self.used_count >= max,
            None => false,
        }
    }
}

/// Normalizes a coupon code for storage and comparison.
///
/// Codes are case-insensitive from the customer's point of view; the
/// uppercase form is canonical at every write and every read-path
/// comparison.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

// =============================================================================
// Site
// =============================================================================

/// A tenant's site. Read-only to this service: the coupon engine only ever
/// resolves ownership, it never creates or mutates sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Site {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning user.
    pub user_id: String,

    /// Display name.
    pub name: String,

    /// When the site was created.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Patch - three-state optional for partial updates
// =============================================================================

/// A three-state optional distinguishing "not provided" from "explicitly
/// cleared" in partial-update requests.
///
/// ## Why Not `Option<Option<T>>`?
/// The distinction must survive serde: an absent JSON key means "leave the
/// stored value untouched" while an explicit `null` means "remove the
/// limit." Collapsing the two into one nullable type silently overwrites
/// stored values with null on partial updates.
///
/// ## Serde Behavior
/// ```text
/// { }                    → Patch::Absent   (requires #[serde(default)])
/// { "maxUses": null }    → Patch::Null
/// { "maxUses": 5 }       → Patch::Value(5)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Key not present in the request: leave the stored value unchanged.
    #[default]
    Absent,
    /// Key explicitly null: clear the stored value.
    Null,
    /// Key present with a value: set the stored value.
    Value(T),
}

impl<T> Patch<T> {
    /// Returns true if the key was not present in the request.
    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    /// Returns the value if present.
    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Resolves the patch against the currently stored value, producing the
    /// merged result: `Absent` keeps the stored value, `Null` clears it,
    /// `Value(v)` replaces it.
    pub fn merge(self, stored: Option<T>) -> Option<T> {
        match self {
            Patch::Absent => stored,
            Patch::Null => None,
            Patch::Value(v) => Some(v),
        }
    }
}

/// Deserializes from an `Option<T>`: a present key maps null → `Null` and a
/// value → `Value`. Absent keys never reach this impl - `#[serde(default)]`
/// on the field supplies `Absent`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

/// Serializes `Null` as an explicit null and `Value` as the value. `Absent`
/// should be skipped at the field level with
/// `#[serde(skip_serializing_if = "Patch::is_absent")]`; if it is not, it
/// serializes as null.
impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Value(v) => serializer.serialize_some(v),
            _ => serializer.serialize_none(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct UpdateShape {
        #[serde(default)]
        max_uses: Patch<i64>,
    }

    #[test]
    fn test_patch_absent() {
        let shape: UpdateShape = serde_json::from_str("{}").unwrap();
        assert_eq!(shape.max_uses, Patch::Absent);
    }

    #[test]
    fn test_patch_null() {
        let shape: UpdateShape = serde_json::from_str(r#"{"max_uses": null}"#).unwrap();
        assert_eq!(shape.max_uses, Patch::Null);
    }

    #[test]
    fn test_patch_value() {
        let shape: UpdateShape = serde_json::from_str(r#"{"max_uses": 5}"#).unwrap();
        assert_eq!(shape.max_uses, Patch::Value(5));
    }

    #[test]
    fn test_patch_merge() {
        assert_eq!(Patch::Absent.merge(Some(3)), Some(3));
        assert_eq!(Patch::<i64>::Null.merge(Some(3)), None);
        assert_eq!(Patch::Value(7).merge(Some(3)), Some(7));
        assert_eq!(Patch::Value(7).merge(None), Some(7));
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("summer10"), "SUMMER10");
        assert_eq!(normalize_code("  Spring-Sale "), "SPRING-SALE");
        assert_eq!(normalize_code("ALREADY"), "ALREADY");
    }

    #[test]
    fn test_uses_exhausted() {
        let mut coupon = sample_coupon();
        assert!(!coupon.uses_exhausted());

        coupon.max_uses = Some(1);
        assert!(!coupon.uses_exhausted());

        coupon.used_count = 1;
        assert!(coupon.uses_exhausted());
    }

    fn sample_coupon() -> Coupon {
        let now = Utc::now();
        Coupon {
            id: "c-1".to_string(),
            site_id: "s-1".to_string(),
            user_id: "u-1".to_string(),
            code: "TEST10".to_string(),
            discount_type: DiscountType::Percentage,
            discount_value: 10,
            min_purchase_cents: None,
            max_uses: None,
            used_count: 0,
            valid_from: now,
            valid_until: now,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
