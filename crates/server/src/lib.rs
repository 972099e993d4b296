//! Tableside server library.
//!
//! The binary in `main.rs` wires everything together; this library exposes
//! the building blocks so the `integration-tests` crate can assemble the
//! same services over in-memory collaborators.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
