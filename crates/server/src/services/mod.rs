//! Core services.
//!
//! - [`orders`] - order / order-item creation pipeline
//! - [`billing`] - per-order billing report aggregation
//! - [`otp`] - one-time-secret lifecycle over a TTL store
//! - [`email`] - mail rendering, transport, and the dispatch worker
//! - [`queue`] - task queue seam carrying pending notification jobs
//! - [`password`] - argon2 password hashing

pub mod billing;
pub mod email;
pub mod orders;
pub mod otp;
pub mod password;
pub mod queue;
