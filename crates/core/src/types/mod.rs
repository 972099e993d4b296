//! Core types for Tableside.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod otp;

pub use email::{Email, EmailError};
pub use id::*;
pub use otp::{OtpCode, OtpCodeError};
