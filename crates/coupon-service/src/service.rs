//! # Coupon Service Operations
//!
//! `CouponService` orchestrates the six operations. Each operation is an
//! independent, stateless request: validation first (no store access on
//! failure), then the tenant guard, then the operation-specific checks.
//!
//! ## Apply: Redemption Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       apply_coupon Flow                                 │
//! │                                                                         │
//! │  validate input ──► resolve site ──► ┌──────────────────────────┐      │
//! │                                      │  read coupon snapshot    │      │
//! │                                      │  ownership check         │      │
//! │                                      │  eligibility check       │      │
//! │                                      │  guarded increment ──────┼─► ok │
//! │                                      │        │ conflict        │      │
//! │                                      └────────┼─────────────────┘      │
//! │                                               ▼                        │
//! │                                      re-read and re-classify           │
//! │                                      (bounded retries)                 │
//! │                                                                         │
//! │  A conflict means a concurrent apply consumed the last use between      │
//! │  our snapshot read and the increment. The fresh snapshot then reports   │
//! │  the precise reason (usually COUPON_MAX_USES) instead of a spurious     │
//! │  internal error.                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use coupon_core::{
    check_eligibility, compute_discount, normalize_code, validation, Coupon, DiscountType, Money,
    Patch,
};
use coupon_db::{CouponUpdate, Database, RedeemOutcome};

use crate::error::{ApiError, ErrorCode};
use crate::plan::{FixedPlanPolicy, PlanPolicy};

/// Bounded retries for the redemption increment when the guarded update
/// conflicts with a concurrent apply.
const MAX_REDEEM_ATTEMPTS: u32 = 3;

// =============================================================================
// Clock
// =============================================================================

/// Time source for eligibility evaluation and timestamps.
///
/// Injected so tests can pin "now" instead of sleeping across validity
/// boundaries.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Input for `create_coupon`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponRequest {
    pub site_id: String,
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    #[serde(default)]
    pub min_purchase_cents: Option<i64>,
    #[serde(default)]
    pub max_uses: Option<i64>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

/// Input for `update_coupon`.
///
/// Every business field is optional; `min_purchase_cents` and `max_uses`
/// are three-state so an explicit null clears the limit while an absent
/// key leaves it untouched.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCouponRequest {
    pub site_id: String,
    pub coupon_id: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub discount_type: Option<DiscountType>,
    #[serde(default)]
    pub discount_value: Option<i64>,
    #[serde(default)]
    pub min_purchase_cents: Patch<i64>,
    #[serde(default)]
    pub max_uses: Patch<i64>,
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Input for `validate_coupon`. Read-only preview keyed by code.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponRequest {
    pub site_id: String,
    pub code: String,
    pub cart_total_cents: i64,
}

/// Input for `apply_coupon`. Redeems by coupon id at order completion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCouponRequest {
    pub site_id: String,
    pub coupon_id: String,
    /// Caller's order reference, echoed back but never persisted.
    pub order_id: String,
    pub cart_total_cents: i64,
}

/// Success payload of `delete_coupon`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCouponResponse {
    pub id: String,
}

/// Success payload of `validate_coupon`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponResponse {
    pub valid: bool,
    pub coupon_id: String,
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub discount_amount_cents: i64,
    pub final_total_cents: i64,
}

/// Success payload of `apply_coupon`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCouponResponse {
    pub coupon_id: String,
    pub order_id: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub discount_amount_cents: i64,
    pub final_total_cents: i64,
    pub used_count: i64,
}

// =============================================================================
// Service
// =============================================================================

/// The coupon service: six operations over one database handle.
///
/// Stateless across requests; all durable state lives in the store. Clone
/// is cheap (pool handle plus two Arcs).
#[derive(Clone)]
pub struct CouponService {
    db: Database,
    plans: Arc<dyn PlanPolicy>,
    clock: Arc<dyn Clock>,
}

impl CouponService {
    /// Creates a service with the default plan policy and the wall clock.
    pub fn new(db: Database) -> Self {
        CouponService {
            db,
            plans: Arc::new(FixedPlanPolicy::default()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the plan-quota policy.
    pub fn with_plan_policy(mut self, plans: Arc<dyn PlanPolicy>) -> Self {
        self.plans = plans;
        self
    }

    /// Replaces the time source. Test seam.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // =========================================================================
    // create
    // =========================================================================

    /// Creates a coupon.
    ///
    /// Check order: structural validation, site resolution, plan quota,
    /// code uniqueness pre-check, insert. The UNIQUE (site_id, code) index
    /// closes the pre-check race: a concurrent duplicate create that slips
    /// past the query still comes back as DUPLICATE_CODE, never as a second
    /// stored coupon.
    pub async fn create_coupon(&self, req: CreateCouponRequest) -> Result<Coupon, ApiError> {
        debug!(site_id = %req.site_id, code = %req.code, "create_coupon");

        validation::validate_id("siteId", &req.site_id)?;
        validation::validate_code(&req.code)?;
        validation::validate_discount(req.discount_type, req.discount_value)?;
        validation::validate_optional_positive("minPurchase", req.min_purchase_cents)?;
        validation::validate_optional_positive("maxUses", req.max_uses)?;
        validation::validate_date_range(req.valid_from, req.valid_until)?;

        let user_id = self.resolve_site(&req.site_id).await?;

        let current = self.db.coupons().count_for_site(&req.site_id).await?;
        let verdict = self.plans.verdict(&user_id, &req.site_id, current);
        if !verdict.allowed {
            let limit = verdict.limit.unwrap_or(current);
            return Err(ApiError::new(
                ErrorCode::CouponLimitReached,
                format!(
                    "Coupon limit reached: {} of {} coupons used",
                    verdict.current, limit
                ),
            )
            .with_details(serde_json::json!({
                "current": verdict.current,
                "limit": verdict.limit,
            })));
        }

        let code = normalize_code(&req.code);
        if self
            .db
            .coupons()
            .find_by_code(&req.site_id, &code)
            .await?
            .is_some()
        {
            return Err(ApiError::duplicate_code(&code));
        }

        let now = self.clock.now();
        let coupon = Coupon {
            id: Uuid::new_v4().to_string(),
            site_id: req.site_id,
            user_id,
            code,
            discount_type: req.discount_type,
            discount_value: req.discount_value,
            min_purchase_cents: req.min_purchase_cents,
            max_uses: req.max_uses,
            used_count: 0,
            valid_from: req.valid_from,
            valid_until: req.valid_until,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.db.coupons().insert(&coupon).await?;

        info!(id = %coupon.id, site_id = %coupon.site_id, code = %coupon.code, "Coupon created");
        Ok(coupon)
    }

    // =========================================================================
    // list
    // =========================================================================

    /// Lists a site's coupons, newest first.
    pub async fn get_coupons(&self, site_id: &str) -> Result<Vec<Coupon>, ApiError> {
        debug!(site_id = %site_id, "get_coupons");

        validation::validate_id("siteId", site_id)?;
        self.resolve_site(site_id).await?;

        Ok(self.db.coupons().list_for_site(site_id).await?)
    }

    // =========================================================================
    // update
    // =========================================================================

    /// Partially updates a coupon.
    ///
    /// Only keys present in the request reach the store; explicit nulls
    /// clear the optional limits. Cross-field invariants are re-evaluated
    /// against the merged values (new where provided, stored otherwise), so
    /// a request touching only one half of a comparison is still caught.
    pub async fn update_coupon(&self, req: UpdateCouponRequest) -> Result<Coupon, ApiError> {
        debug!(site_id = %req.site_id, coupon_id = %req.coupon_id, "update_coupon");

        validation::validate_id("siteId", &req.site_id)?;
        validation::validate_id("couponId", &req.coupon_id)?;
        if let Some(ref code) = req.code {
            validation::validate_code(code)?;
        }
        validation::validate_update_cross_fields(
            req.discount_type,
            req.discount_value,
            req.valid_from,
            req.valid_until,
        )?;
        validation::validate_optional_positive(
            "minPurchase",
            req.min_purchase_cents.value().copied(),
        )?;
        validation::validate_optional_positive("maxUses", req.max_uses.value().copied())?;

        self.resolve_site(&req.site_id).await?;
        let stored = self.load_owned_coupon(&req.site_id, &req.coupon_id).await?;

        // Uniqueness only matters when the code actually changes
        let new_code = match req.code {
            Some(ref code) => {
                let normalized = normalize_code(code);
                if normalized != stored.code {
                    if self
                        .db
                        .coupons()
                        .find_by_code(&req.site_id, &normalized)
                        .await?
                        .is_some()
                    {
                        return Err(ApiError::duplicate_code(&normalized));
                    }
                    Some(normalized)
                } else {
                    None
                }
            }
            None => None,
        };

        // Invariants hold against the final merged values
        validation::validate_merged(
            req.discount_type.unwrap_or(stored.discount_type),
            req.discount_value.unwrap_or(stored.discount_value),
            req.valid_from.unwrap_or(stored.valid_from),
            req.valid_until.unwrap_or(stored.valid_until),
        )?;

        let update = CouponUpdate {
            code: new_code,
            discount_type: req.discount_type,
            discount_value: req.discount_value,
            min_purchase_cents: req.min_purchase_cents,
            max_uses: req.max_uses,
            valid_from: req.valid_from,
            valid_until: req.valid_until,
            is_active: req.is_active,
        };

        if !update.is_empty() {
            self.db.coupons().update(&req.coupon_id, &update).await?;
        }

        let updated = self
            .db
            .coupons()
            .get_by_id(&req.coupon_id)
            .await?
            .ok_or_else(|| ApiError::coupon_not_found(&req.coupon_id))?;

        info!(id = %updated.id, site_id = %updated.site_id, "Coupon updated");
        Ok(updated)
    }

    // =========================================================================
    // delete
    // =========================================================================

    /// Deletes a coupon after checking existence and ownership.
    pub async fn delete_coupon(
        &self,
        site_id: &str,
        coupon_id: &str,
    ) -> Result<DeleteCouponResponse, ApiError> {
        debug!(site_id = %site_id, coupon_id = %coupon_id, "delete_coupon");

        validation::validate_id("siteId", site_id)?;
        validation::validate_id("couponId", coupon_id)?;

        self.resolve_site(site_id).await?;
        let coupon = self.load_owned_coupon(site_id, coupon_id).await?;

        if !self.db.coupons().delete(&coupon.id).await? {
            // Lost a race with a concurrent delete
            return Err(ApiError::coupon_not_found(coupon_id));
        }

        info!(id = %coupon.id, site_id = %site_id, "Coupon deleted");
        Ok(DeleteCouponResponse { id: coupon.id })
    }

    // =========================================================================
    // validate
    // =========================================================================

    /// Previews a coupon against a cart. Read-only: never touches
    /// `used_count`, safe to call arbitrarily many times.
    pub async fn validate_coupon(
        &self,
        req: ValidateCouponRequest,
    ) -> Result<ValidateCouponResponse, ApiError> {
        debug!(site_id = %req.site_id, code = %req.code, "validate_coupon");

        validation::validate_id("siteId", &req.site_id)?;
        validation::validate_code(&req.code)?;
        validation::validate_cart_total(req.cart_total_cents)?;

        self.resolve_site(&req.site_id).await?;

        let coupon = self
            .db
            .coupons()
            .find_by_code(&req.site_id, &req.code)
            .await?
            .ok_or_else(|| ApiError::coupon_not_found(&req.code))?;

        let cart_total = Money::from_cents(req.cart_total_cents);
        check_eligibility(&coupon, cart_total, self.clock.now()).map_err(ApiError::from)?;

        let discount = compute_discount(coupon.discount_type, coupon.discount_value, cart_total);

        Ok(ValidateCouponResponse {
            valid: true,
            coupon_id: coupon.id,
            code: coupon.code,
            discount_type: coupon.discount_type,
            discount_value: coupon.discount_value,
            discount_amount_cents: discount.discount_amount.cents(),
            final_total_cents: discount.final_total.cents(),
        })
    }

    // =========================================================================
    // apply
    // =========================================================================

    /// Redeems a coupon against an order: eligibility check plus the atomic
    /// usage increment.
    ///
    /// The increment is a single guarded UPDATE, so `used_count` can never
    /// pass `max_uses` no matter how many applies race. When the guard
    /// rejects our attempt (a concurrent apply got there first), the coupon
    /// is re-read and re-classified so the caller sees the precise reason.
    pub async fn apply_coupon(
        &self,
        req: ApplyCouponRequest,
    ) -> Result<ApplyCouponResponse, ApiError> {
        debug!(
            site_id = %req.site_id,
            coupon_id = %req.coupon_id,
            order_id = %req.order_id,
            "apply_coupon"
        );

        validation::validate_id("siteId", &req.site_id)?;
        validation::validate_id("couponId", &req.coupon_id)?;
        validation::validate_id("orderId", &req.order_id)?;
        validation::validate_cart_total(req.cart_total_cents)?;

        self.resolve_site(&req.site_id).await?;
        let cart_total = Money::from_cents(req.cart_total_cents);

        for _attempt in 0..MAX_REDEEM_ATTEMPTS {
            let coupon = self.load_owned_coupon(&req.site_id, &req.coupon_id).await?;

            let now = self.clock.now();
            check_eligibility(&coupon, cart_total, now).map_err(ApiError::from)?;

            match self.db.coupons().redeem(&coupon.id, now).await? {
                RedeemOutcome::Redeemed { new_used_count } => {
                    let discount =
                        compute_discount(coupon.discount_type, coupon.discount_value, cart_total);

                    info!(
                        id = %coupon.id,
                        site_id = %req.site_id,
                        order_id = %req.order_id,
                        used_count = new_used_count,
                        discount_cents = discount.discount_amount.cents(),
                        "Coupon applied"
                    );

                    return Ok(ApplyCouponResponse {
                        coupon_id: coupon.id,
                        order_id: req.order_id,
                        discount_type: coupon.discount_type,
                        discount_value: coupon.discount_value,
                        discount_amount_cents: discount.discount_amount.cents(),
                        final_total_cents: discount.final_total.cents(),
                        used_count: new_used_count,
                    });
                }
                RedeemOutcome::Conflict => {
                    // Concurrent apply (or delete) changed the state between
                    // our snapshot and the increment. The next iteration
                    // re-reads and classifies the fresh state.
                    debug!(id = %coupon.id, "Redemption conflict, re-reading");
                    continue;
                }
            }
        }

        warn!(
            coupon_id = %req.coupon_id,
            attempts = MAX_REDEEM_ATTEMPTS,
            "Redemption kept conflicting"
        );
        Err(ApiError::internal())
    }

    // =========================================================================
    // Guards
    // =========================================================================

    /// Resolves the site to its owner, failing with SITE_NOT_FOUND.
    async fn resolve_site(&self, site_id: &str) -> Result<String, ApiError> {
        self.db
            .sites()
            .resolve_owner(site_id)
            .await?
            .ok_or_else(|| ApiError::site_not_found(site_id))
    }

    /// Loads a coupon and checks it belongs to the requested site.
    ///
    /// The FORBIDDEN arm is what makes the system multi-tenant-safe: an
    /// identifier valid in one tenant must never resolve cross-tenant.
    async fn load_owned_coupon(&self, site_id: &str, coupon_id: &str) -> Result<Coupon, ApiError> {
        let coupon = self
            .db
            .coupons()
            .get_by_id(coupon_id)
            .await?
            .ok_or_else(|| ApiError::coupon_not_found(coupon_id))?;

        if coupon.site_id != site_id {
            warn!(
                coupon_id = %coupon_id,
                requested_site = %site_id,
                "Cross-tenant coupon access refused"
            );
            return Err(ApiError::forbidden());
        }

        Ok(coupon)
    }
}

// =============================================================================
// Operation Tests
// =============================================================================
