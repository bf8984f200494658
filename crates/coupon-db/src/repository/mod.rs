//! # Repository Layer
//!
//! Repository implementations for database entities.
//!
//! ## Repositories
//! - [`coupon`] - Coupon CRUD, indexed code lookup, and the atomic
//!   redemption counter
//! - [`site`] - Read-only tenant ownership resolution

pub mod coupon;
pub mod site;
