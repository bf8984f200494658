//! # coupon-service: The Six Coupon Operations
//!
//! The orchestration layer of the coupon service. Requests arrive already
//! authenticated (the caller supplies a validated tenant context in the
//! form of a `site_id`); this crate validates them, guards tenant
//! ownership, consults plan quotas, runs the eligibility engine, and talks
//! to the store.
//!
//! ## Control Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Operation Pipeline                               │
//! │                                                                         │
//! │  request ──► Validation Layer (coupon-core, no store access)           │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │          Tenant/Ownership Guard (site exists? coupon on this site?)    │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │   mutations: Uniqueness & Limit Checks (code pre-check, plan quota)    │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │   validate/apply: Eligibility Engine (pure, coupon-core)               │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │   apply only: Redemption (atomic conditional increment, coupon-db)     │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │  Result<payload, ApiError>  (exactly one of data/error)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`service`] - `CouponService` and the six operations
//! - [`error`] - `ApiError` and the external error-code taxonomy
//! - [`plan`] - plan-quota collaborator seam

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod plan;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ApiError, ErrorCode};
pub use plan::{FixedPlanPolicy, PlanPolicy, PlanVerdict};
pub use service::{
    ApplyCouponRequest, ApplyCouponResponse, Clock, CouponService, CreateCouponRequest,
    DeleteCouponResponse, SystemClock, UpdateCouponRequest, ValidateCouponRequest,
    ValidateCouponResponse,
};
