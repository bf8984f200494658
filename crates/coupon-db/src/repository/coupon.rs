//! # Coupon Repository
//!
//! Database operations for coupons, including the redemption counter.
//!
//! ## Redemption Counter
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Concurrent Apply on One Coupon                         │
//! │                                                                         │
//! │   Request A                       Request B                             │
//! │      │                               │                                  │
//! │      ▼                               ▼                                  │
//! │   read snapshot (used=0, max=1)   read snapshot (used=0, max=1)         │
//! │      │                               │                                  │
//! │      ▼                               ▼                                  │
//! │   UPDATE … used_count + 1         UPDATE … used_count + 1               │
//! │   WHERE used_count < max_uses     WHERE used_count < max_uses           │
//! │      │                               │                                  │
//! │      ▼                               ▼                                  │
//! │   1 row → Redeemed(used=1)        0 rows → Conflict                     │
//! │                                      │                                  │
//! │                                      ▼                                  │
//! │                               caller re-reads fresh state               │
//! │                               and reports COUPON_MAX_USES               │
//! │                                                                         │
//! │  SQLite executes each statement atomically and serializes writers,     │
//! │  so the guarded increment can never overshoot the cap - lost updates   │
//! │  are impossible under any interleaving.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use coupon_core::{normalize_code, Coupon, DiscountType, Patch};

const COUPON_COLUMNS: &str = "id, site_id, user_id, code, discount_type, discount_value, \
     min_purchase_cents, max_uses, used_count, valid_from, valid_until, \
     is_active, created_at, updated_at";

/// The outcome of a redemption attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemOutcome {
    /// The counter was incremented; carries the new `used_count`.
    Redeemed { new_used_count: i64 },
    /// The guarded increment matched no row: either the coupon vanished or
    /// a concurrent apply consumed the last use. The caller re-reads fresh
    /// state to classify the precise reason.
    Conflict,
}

/// A filtered update set for partial coupon updates.
///
/// `None` / `Patch::Absent` fields are left untouched in the stored record;
/// `Patch::Null` clears an optional limit. The handler validates merged
/// values before constructing this.
#[derive(Debug, Clone, Default)]
pub struct CouponUpdate {
    /// New code, already uppercase-normalized by the caller.
    pub code: Option<String>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<i64>,
    pub min_purchase_cents: Patch<i64>,
    pub max_uses: Patch<i64>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

impl CouponUpdate {
    /// Returns true if no field would change.
    pub fn is_empty(&self) -> bool {
        self.code.is_none()
            && self.discount_type.is_none()
            && self.discount_value.is_none()
            && self.min_purchase_cents.is_absent()
            && self.max_uses.is_absent()
            && self.valid_from.is_none()
            && self.valid_until.is_none()
            && self.is_active.is_none()
    }
}

/// Repository for coupon database operations.
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    /// Creates a new CouponRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Gets a coupon by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Coupon>> {
        let coupon: Option<Coupon> = sqlx::query_as(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(coupon)
    }

    /// Finds a coupon by (site, code).
    ///
    /// The code is uppercase-normalized before the query predicate, matching
    /// the normalization applied at every write - lookup is case-insensitive
    /// from the caller's point of view.
    pub async fn find_by_code(&self, site_id: &str, code: &str) -> DbResult<Option<Coupon>> {
        let normalized = normalize_code(code);

        let coupon: Option<Coupon> = sqlx::query_as(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE site_id = ?1 AND code = ?2"
        ))
        .bind(site_id)
        .bind(&normalized)
        .fetch_optional(&self.pool)
        .await?;

        Ok(coupon)
    }

    /// Lists all coupons for a site, newest first.
    pub async fn list_for_site(&self, site_id: &str) -> DbResult<Vec<Coupon>> {
        let coupons: Vec<Coupon> = sqlx::query_as(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE site_id = ?1 ORDER BY created_at DESC"
        ))
        .bind(site_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(coupons)
    }

    /// Counts coupons on a site. Used by the plan-quota check.
    pub async fn count_for_site(&self, site_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coupons WHERE site_id = ?1")
            .bind(site_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Inserts a coupon.
    ///
    /// The caller is responsible for uppercase-normalizing the code; the
    /// UNIQUE (site_id, code) index surfaces duplicate codes that slipped
    /// past the pre-check query as [`DbError::UniqueViolation`].
    pub async fn insert(&self, coupon: &Coupon) -> DbResult<()> {
        debug!(id = %coupon.id, site_id = %coupon.site_id, code = %coupon.code, "Inserting coupon");

        sqlx::query(
            r#"
            INSERT INTO coupons (
                id, site_id, user_id, code,
                discount_type, discount_value,
                min_purchase_cents, max_uses, used_count,
                valid_from, valid_until, is_active,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6,
                ?7, ?8, ?9,
                ?10, ?11, ?12,
                ?13, ?14
            )
            "#,
        )
        .bind(&coupon.id)
        .bind(&coupon.site_id)
        .bind(&coupon.user_id)
        .bind(&coupon.code)
        .bind(coupon.discount_type)
        .bind(coupon.discount_value)
        .bind(coupon.min_purchase_cents)
        .bind(coupon.max_uses)
        .bind(coupon.used_count)
        .bind(coupon.valid_from)
        .bind(coupon.valid_until)
        .bind(coupon.is_active)
        .bind(coupon.created_at)
        .bind(coupon.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Applies a filtered update set to a coupon.
    ///
    /// Only the fields present in `update` reach the SQL; absent fields are
    /// not mentioned in the statement at all, so the stored values survive
    /// untouched. `updated_at` is always refreshed.
    pub async fn update(&self, id: &str, update: &CouponUpdate) -> DbResult<()> {
        debug!(id = %id, "Updating coupon");

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE coupons SET ");
        let mut fields = builder.separated(", ");

        if let Some(ref code) = update.code {
            fields.push("code = ").push_bind_unseparated(code.clone());
        }
        if let Some(kind) = update.discount_type {
            fields.push("discount_type = ").push_bind_unseparated(kind);
        }
        if let Some(value) = update.discount_value {
            fields.push("discount_value = ").push_bind_unseparated(value);
        }
        match update.min_purchase_cents {
            Patch::Absent => {}
            Patch::Null => {
                fields.push("min_purchase_cents = NULL");
            }
            Patch::Value(v) => {
                fields.push("min_purchase_cents = ").push_bind_unseparated(v);
            }
        }
        match update.max_uses {
            Patch::Absent => {}
            Patch::Null => {
                fields.push("max_uses = NULL");
            }
            Patch::Value(v) => {
                fields.push("max_uses = ").push_bind_unseparated(v);
            }
        }
        if let Some(from) = update.valid_from {
            fields.push("valid_from = ").push_bind_unseparated(from);
        }
        if let Some(until) = update.valid_until {
            fields.push("valid_until = ").push_bind_unseparated(until);
        }
        if let Some(active) = update.is_active {
            fields.push("is_active = ").push_bind_unseparated(active);
        }
        fields.push("updated_at = ").push_bind_unseparated(Utc::now());

        builder.push(" WHERE id = ").push_bind(id);

        let result = builder.build().execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", id));
        }

        Ok(())
    }

    /// Deletes a coupon.
    ///
    /// Returns true if a row was removed. Existence and ownership are the
    /// handler's concern; this is the raw removal.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting coupon");

        let result = sqlx::query("DELETE FROM coupons WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Atomically increments a coupon's usage counter, refusing to pass the
    /// cap.
    ///
    /// A single conditional UPDATE with RETURNING: the `used_count <
    /// max_uses` guard and the increment execute as one atomic statement,
    /// which is what keeps `used_count <= max_uses` under concurrent
    /// applies. A caller whose snapshot passed eligibility can still lose
    /// the race here and gets [`RedeemOutcome::Conflict`].
    pub async fn redeem(&self, id: &str, now: DateTime<Utc>) -> DbResult<RedeemOutcome> {
        debug!(id = %id, "Incrementing coupon usage");

        let new_count: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE coupons
            SET used_count = used_count + 1,
                updated_at = ?2
            WHERE id = ?1
              AND (max_uses IS NULL OR used_count < max_uses)
            RETURNING used_count
            "#,
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match new_count {
            Some(new_used_count) => RedeemOutcome::Redeemed { new_used_count },
            None => RedeemOutcome::Conflict,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;
    use coupon_core::Site;
    use uuid::Uuid;

    async fn test_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let site = Site {
            id: "site-1".to_string(),
            user_id: "user-1".to_string(),
            name: "Shop".to_string(),
            created_at: Utc::now(),
        };
        db.sites().insert(&site).await.unwrap();
        db
    }

    fn sample_coupon(code: &str) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: Uuid::new_v4().to_string(),
            site_id: "site-1".to_string(),
            user_id: "user-1".to_string(),
            code: normalize_code(code),
            discount_type: DiscountType::Percentage,
            discount_value: 10,
            min_purchase_cents: None,
            max_uses: None,
            used_count: 0,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(30),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let coupon = sample_coupon("WELCOME10");
        db.coupons().insert(&coupon).await.unwrap();

        let stored = db.coupons().get_by_id(&coupon.id).await.unwrap().unwrap();
        assert_eq!(stored.code, "WELCOME10");
        assert_eq!(stored.discount_value, 10);
        assert_eq!(stored.used_count, 0);
        assert!(stored.is_active);
    }

    #[tokio::test]
    async fn test_find_by_code_case_insensitive() {
        let db = test_db().await;
        db.coupons().insert(&sample_coupon("SUMMER10")).await.unwrap();

        let found = db
            .coupons()
            .find_by_code("site-1", "summer10")
            .await
            .unwrap();
        assert!(found.is_some());

        let missing = db.coupons().find_by_code("site-1", "NOPE").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_unique_violation() {
        let db = test_db().await;
        db.coupons().insert(&sample_coupon("DUPE")).await.unwrap();

        let err = db.coupons().insert(&sample_coupon("DUPE")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_partial_update_preserves_untouched_fields() {
        let db = test_db().await;
        let mut coupon = sample_coupon("KEEP");
        coupon.min_purchase_cents = Some(5000);
        db.coupons().insert(&coupon).await.unwrap();

        let update = CouponUpdate {
            discount_value: Some(20),
            ..Default::default()
        };
        db.coupons().update(&coupon.id, &update).await.unwrap();

        let stored = db.coupons().get_by_id(&coupon.id).await.unwrap().unwrap();
        assert_eq!(stored.discount_value, 20);
        // Untouched fields survive
        assert_eq!(stored.min_purchase_cents, Some(5000));
        assert_eq!(stored.code, "KEEP");
        assert!(stored.updated_at >= coupon.updated_at);
    }

    #[tokio::test]
    async fn test_update_clears_limit_with_null_patch() {
        let db = test_db().await;
        let mut coupon = sample_coupon("CLEAR");
        coupon.max_uses = Some(10);
        coupon.min_purchase_cents = Some(2000);
        db.coupons().insert(&coupon).await.unwrap();

        let update = CouponUpdate {
            max_uses: Patch::Null,
            ..Default::default()
        };
        db.coupons().update(&coupon.id, &update).await.unwrap();

        let stored = db.coupons().get_by_id(&coupon.id).await.unwrap().unwrap();
        assert_eq!(stored.max_uses, None);
        // Absent patch leaves the other limit in place
        assert_eq!(stored.min_purchase_cents, Some(2000));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        let coupon = sample_coupon("GONE");
        db.coupons().insert(&coupon).await.unwrap();

        assert!(db.coupons().delete(&coupon.id).await.unwrap());
        assert!(!db.coupons().delete(&coupon.id).await.unwrap());
        assert!(db.coupons().get_by_id(&coupon.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_redeem_increments_and_stops_at_cap() {
        let db = test_db().await;
        let mut coupon = sample_coupon("ONCE");
        coupon.max_uses = Some(1);
        db.coupons().insert(&coupon).await.unwrap();

        let now = Utc::now();
        let first = db.coupons().redeem(&coupon.id, now).await.unwrap();
        assert_eq!(first, RedeemOutcome::Redeemed { new_used_count: 1 });

        let second = db.coupons().redeem(&coupon.id, now).await.unwrap();
        assert_eq!(second, RedeemOutcome::Conflict);

        let stored = db.coupons().get_by_id(&coupon.id).await.unwrap().unwrap();
        assert_eq!(stored.used_count, 1);
    }

    #[tokio::test]
    async fn test_redeem_unlimited_keeps_counting() {
        let db = test_db().await;
        let coupon = sample_coupon("FOREVER");
        db.coupons().insert(&coupon).await.unwrap();

        let now = Utc::now();
        for expected in 1..=5 {
            let outcome = db.coupons().redeem(&coupon.id, now).await.unwrap();
            assert_eq!(
                outcome,
                RedeemOutcome::Redeemed {
                    new_used_count: expected
                }
            );
        }
    }

    #[tokio::test]
    async fn test_redeem_missing_coupon_is_conflict() {
        let db = test_db().await;
        let outcome = db.coupons().redeem("no-such-id", Utc::now()).await.unwrap();
        assert_eq!(outcome, RedeemOutcome::Conflict);
    }

    #[tokio::test]
    async fn test_same_code_on_two_sites() {
        let db = test_db().await;
        let site2 = Site {
            id: "site-2".to_string(),
            user_id: "user-2".to_string(),
            name: "Other Shop".to_string(),
            created_at: Utc::now(),
        };
        db.sites().insert(&site2).await.unwrap();

        db.coupons().insert(&sample_coupon("SHARED")).await.unwrap();
        let mut other = sample_coupon("SHARED");
        other.site_id = "site-2".to_string();
        other.user_id = "user-2".to_string();
        // Same code on a different site is allowed
        db.coupons().insert(&other).await.unwrap();

        assert_eq!(db.coupons().count_for_site("site-1").await.unwrap(), 1);
        assert_eq!(db.coupons().count_for_site("site-2").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_for_site_scoped() {
        let db = test_db().await;
        db.coupons().insert(&sample_coupon("A1")).await.unwrap();
        db.coupons().insert(&sample_coupon("A2")).await.unwrap();

        let list = db.coupons().list_for_site("site-1").await.unwrap();
        assert_eq!(list.len(), 2);

        let empty = db.coupons().list_for_site("site-9").await.unwrap();
        assert!(empty.is_empty());
    }
}
