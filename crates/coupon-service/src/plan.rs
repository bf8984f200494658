//! # Plan Quota Policy
//!
//! Per-site coupon quotas, decided by an injectable policy so the service
//! itself stays free of billing knowledge. The service counts the site's
//! live coupons and asks the policy for a verdict before every create.

/// Outcome of a quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanVerdict {
    /// Whether one more coupon may be created on this site
    pub allowed: bool,

    /// How many coupons the site currently has
    pub current: i64,

    /// The plan's cap (`None` = unlimited)
    pub limit: Option<i64>,
}

impl PlanVerdict {
    /// Verdict for an unlimited plan.
    pub fn unlimited(current: i64) -> Self {
        PlanVerdict {
            allowed: true,
            current,
            limit: None,
        }
    }

    /// Verdict for a capped plan; allows creation while `current < limit`.
    pub fn capped(current: i64, limit: i64) -> Self {
        PlanVerdict {
            allowed: current < limit,
            current,
            limit: Some(limit),
        }
    }
}

/// Decides whether a site owner may create another coupon.
///
/// Implementations look up the owner's subscription however they like;
/// the default [`FixedPlanPolicy`] applies one cap to everyone.
pub trait PlanPolicy: Send + Sync {
    /// Returns the quota verdict for `user_id`'s site given its current
    /// coupon count.
    fn verdict(&self, user_id: &str, site_id: &str, current: i64) -> PlanVerdict;
}

/// A policy that grants every site the same fixed coupon cap.
#[derive(Debug, Clone, Copy)]
pub struct FixedPlanPolicy {
    max_coupons: i64,
}

impl FixedPlanPolicy {
    /// Cap applied when no policy is configured explicitly.
    pub const DEFAULT_MAX_COUPONS: i64 = 50;

    pub fn new(max_coupons: i64) -> Self {
        FixedPlanPolicy { max_coupons }
    }
}

impl Default for FixedPlanPolicy {
    fn default() -> Self {
        FixedPlanPolicy::new(Self::DEFAULT_MAX_COUPONS)
    }
}

impl PlanPolicy for FixedPlanPolicy {
    fn verdict(&self, _user_id: &str, _site_id: &str, current: i64) -> PlanVerdict {
        PlanVerdict::capped(current, self.max_coupons)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_policy_allows_below_cap() {
        let policy = FixedPlanPolicy::new(3);
        let v = policy.verdict("user-1", "site-1", 2);
        assert!(v.allowed);
        assert_eq!(v.limit, Some(3));
    }

    #[test]
    fn test_fixed_policy_denies_at_cap() {
        let policy = FixedPlanPolicy::new(3);
        assert!(!policy.verdict("user-1", "site-1", 3).allowed);
        assert!(!policy.verdict("user-1", "site-1", 4).allowed);
    }

    #[test]
    fn test_default_cap() {
        let policy = FixedPlanPolicy::default();
        assert!(policy.verdict("u", "s", 49).allowed);
        assert!(!policy.verdict("u", "s", 50).allowed);
    }

    #[test]
    fn test_unlimited_verdict() {
        let v = PlanVerdict::unlimited(10_000);
        assert!(v.allowed);
        assert_eq!(v.limit, None);
    }
}
