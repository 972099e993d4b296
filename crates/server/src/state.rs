//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::db::{
    FoodRepository, OrderItemRepository, OrderRepository, TableRepository, UserRepository,
    memory::MemoryStore, postgres::PgStore,
};
use crate::services::billing::BillingService;
use crate::services::orders::OrderService;
use crate::services::otp::{OtpService, OtpStore};
use crate::services::queue::TaskQueue;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the repositories, the OTP store, and the task
/// queue.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    orders: OrderService,
    billing: BillingService,
    otp: OtpService,
    users: Arc<dyn UserRepository>,
    queue: Arc<dyn TaskQueue>,
    pool: Option<PgPool>,
}

impl AppState {
    /// Assemble state from explicit collaborators.
    #[must_use]
    pub fn new(
        foods: Arc<dyn FoodRepository>,
        tables: Arc<dyn TableRepository>,
        orders: Arc<dyn OrderRepository>,
        order_items: Arc<dyn OrderItemRepository>,
        users: Arc<dyn UserRepository>,
        otp_store: Arc<dyn OtpStore>,
        queue: Arc<dyn TaskQueue>,
        pool: Option<PgPool>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                orders: OrderService::new(
                    foods.clone(),
                    tables.clone(),
                    orders.clone(),
                    order_items.clone(),
                ),
                billing: BillingService::new(foods, tables, orders, order_items),
                otp: OtpService::new(otp_store),
                users,
                queue,
                pool,
            }),
        }
    }

    /// Wire state over the Postgres-backed repositories.
    #[must_use]
    pub fn with_postgres(
        store: PgStore,
        otp_store: Arc<dyn OtpStore>,
        queue: Arc<dyn TaskQueue>,
    ) -> Self {
        let pool = store.pool().clone();
        let store = Arc::new(store);
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            otp_store,
            queue,
            Some(pool),
        )
    }

    /// Wire state over in-memory repositories. Used by tests.
    #[must_use]
    pub fn with_memory(
        store: Arc<MemoryStore>,
        otp_store: Arc<dyn OtpStore>,
        queue: Arc<dyn TaskQueue>,
    ) -> Self {
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            otp_store,
            queue,
            None,
        )
    }

    /// Get the order creation pipeline.
    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.orders
    }

    /// Get the billing aggregation engine.
    #[must_use]
    pub fn billing(&self) -> &BillingService {
        &self.inner.billing
    }

    /// Get the OTP service.
    #[must_use]
    pub fn otp(&self) -> &OtpService {
        &self.inner.otp
    }

    /// Get the account repository.
    #[must_use]
    pub fn users(&self) -> &dyn UserRepository {
        self.inner.users.as_ref()
    }

    /// Get the notification task queue.
    #[must_use]
    pub fn queue(&self) -> &dyn TaskQueue {
        self.inner.queue.as_ref()
    }

    /// Get the database connection pool, if this state is Postgres-backed.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
