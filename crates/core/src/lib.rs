//! Tableside Core - Shared domain types.
//!
//! This crate provides the common types used across the Tableside workspace:
//!
//! - `server` - Restaurant back-office API binary
//! - `integration-tests` - End-to-end tests over in-memory collaborators
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and OTP codes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
