//! Persistence seam for the document-store collaborators.
//!
//! The core pipelines only ever talk to the repository traits defined here;
//! driver plumbing stays behind them. Two implementations are provided:
//!
//! - [`postgres::PgStore`] - production implementation over `PostgreSQL`
//! - [`memory::MemoryStore`] - in-memory implementation used by tests
//!
//! ## Tables (Postgres)
//!
//! - `food` - pricing catalog
//! - `dining_table` - dining tables
//! - `restaurant_order` - orders
//! - `order_item` - order lines
//! - `account` - back-office accounts
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/` and are NOT run
//! automatically on startup. Apply them with `sqlx migrate run` (or any SQL
//! runner) before first boot.

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use tableside_core::{Email, FoodId, OrderId, TableId};

use crate::models::{Food, Order, OrderItem, Table, User};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Store rejected or lost the operation (used by test doubles and
    /// non-SQL backends).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// The acquire timeout doubles as the per-operation latency bound: a request
/// that cannot obtain a connection within it fails rather than queueing
/// indefinitely.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Pricing catalog lookups and writes.
#[async_trait]
pub trait FoodRepository: Send + Sync {
    /// Look up a catalog item by entity id.
    async fn get(&self, id: FoodId) -> Result<Option<Food>, RepositoryError>;

    /// Insert a catalog item.
    async fn insert(&self, food: &Food) -> Result<(), RepositoryError>;
}

/// Dining table lookups and writes.
#[async_trait]
pub trait TableRepository: Send + Sync {
    /// Look up a table by entity id.
    async fn get(&self, id: TableId) -> Result<Option<Table>, RepositoryError>;

    /// Insert a table.
    async fn insert(&self, table: &Table) -> Result<(), RepositoryError>;
}

/// Order writes and lookups.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Look up an order by entity id.
    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Insert an order.
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError>;

    /// Delete an order, returning whether a row was removed.
    ///
    /// Used as the compensating action when the order-item batch insert
    /// fails after the order write succeeded.
    async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError>;
}

/// Order line writes and lookups.
#[async_trait]
pub trait OrderItemRepository: Send + Sync {
    /// Insert all lines of an order in a single batch. All-or-nothing: on
    /// error no line is persisted.
    async fn insert_many(&self, items: &[OrderItem]) -> Result<(), RepositoryError>;

    /// All lines belonging to the given order, in insertion order.
    async fn find_by_order(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError>;
}

/// Account lookups and writes.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up an account by email.
    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Insert an account. Fails with [`RepositoryError::Conflict`] when the
    /// email is already taken.
    async fn insert(&self, user: &User) -> Result<(), RepositoryError>;

    /// Mark the account verified, returning whether it existed.
    async fn set_verified(&self, email: &Email) -> Result<bool, RepositoryError>;

    /// Replace the account's password hash, returning whether it existed.
    async fn set_password_hash(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<bool, RepositoryError>;
}
