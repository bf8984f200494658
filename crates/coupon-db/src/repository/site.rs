//! # Site Repository
//!
//! Read-only access to tenant sites. The coupon engine only ever resolves
//! ownership; it never creates or mutates sites (the insert below exists
//! for seeding and tests).

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use coupon_core::Site;

/// Repository for site lookups.
#[derive(Debug, Clone)]
pub struct SiteRepository {
    pool: SqlitePool,
}

impl SiteRepository {
    /// Creates a new SiteRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SiteRepository { pool }
    }

    /// Resolves a site to its owning user.
    ///
    /// This is the tenant/ownership guard's primitive: every operation
    /// resolves the site first and fails with SITE_NOT_FOUND when this
    /// returns None.
    pub async fn resolve_owner(&self, site_id: &str) -> DbResult<Option<String>> {
        let user_id: Option<String> =
            sqlx::query_scalar("SELECT user_id FROM sites WHERE id = ?1")
                .bind(site_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user_id)
    }

    /// Gets a site by ID.
    pub async fn get_by_id(&self, site_id: &str) -> DbResult<Option<Site>> {
        let site: Option<Site> = sqlx::query_as(
            r#"
            SELECT id, user_id, name, created_at
            FROM sites
            WHERE id = ?1
            "#,
        )
        .bind(site_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(site)
    }

    /// Inserts a site. Used by the seed binary and tests only.
    pub async fn insert(&self, site: &Site) -> DbResult<()> {
        debug!(id = %site.id, user_id = %site.user_id, "Inserting site");

        sqlx::query(
            r#"
            INSERT INTO sites (id, user_id, name, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&site.id)
        .bind(&site.user_id)
        .bind(&site.name)
        .bind(site.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
