//! Integration test harness for Tableside.
//!
//! Builds the full router over the in-memory repositories, the real TTL
//! OTP cache, and the real task queue, so tests exercise the same code
//! paths as production minus Postgres and SMTP.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tableside-integration-tests
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use tableside_server::db::memory::MemoryStore;
use tableside_server::models::{Food, Table};
use tableside_server::routes;
use tableside_server::services::email::{EmailError, EmailKind, EmailTask, Mailer};
use tableside_server::services::otp::MokaOtpStore;
use tableside_server::services::queue::{MemoryQueue, TaskQueue};
use tableside_server::state::AppState;

use tableside_core::{FoodId, TableId};

/// The wired application with handles to its collaborators.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub otp_store: Arc<MokaOtpStore>,
    pub queue: Arc<MemoryQueue>,
}

impl TestApp {
    /// Wire the router over fresh in-memory collaborators.
    #[must_use]
    pub fn new() -> Self {
        Self::with_otp_store(Arc::new(MokaOtpStore::new()))
    }

    /// Same, but with a caller-supplied OTP store (for short-TTL tests).
    #[must_use]
    pub fn with_otp_store(otp_store: Arc<MokaOtpStore>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(MemoryQueue::new());
        let state = AppState::with_memory(store.clone(), otp_store.clone(), queue.clone());
        let router = routes::router().with_state(state);

        Self {
            router,
            store,
            otp_store,
            queue,
        }
    }

    /// Send a JSON POST and decode the JSON response.
    pub async fn post(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds");

        self.send(request).await
    }

    /// Send a GET and decode the JSON response.
    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(path)
            .body(Body::empty())
            .expect("request builds");

        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body is JSON")
        };

        (status, json)
    }

    /// Pop the next queued notification task, failing fast if none arrives.
    pub async fn pop_task(&self) -> EmailTask {
        let payload = tokio::time::timeout(Duration::from_secs(1), self.queue.pop())
            .await
            .expect("a task was queued")
            .expect("queue is open");
        serde_json::from_slice(&payload).expect("task payload decodes")
    }

    /// Seed a catalog item, returning its id.
    pub async fn seed_food(&self, name: &str, price: Decimal) -> FoodId {
        let food = Food::new(name, price, None);
        let id = food.food_id;
        tableside_server::db::FoodRepository::insert(self.store.as_ref(), &food)
            .await
            .expect("food seeds");
        id
    }

    /// Seed a dining table, returning its id.
    pub async fn seed_table(&self, table_number: i32) -> TableId {
        let table = Table::new(table_number, 2);
        let id = table.table_id;
        tableside_server::db::TableRepository::insert(self.store.as_ref(), &table)
            .await
            .expect("table seeds");
        id
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Mailer double that records deliveries instead of talking SMTP.
#[derive(Default)]
pub struct RecordingMailer {
    sent: tokio::sync::Mutex<Vec<(EmailKind, String, String)>>,
    fail_next: AtomicBool,
}

impl RecordingMailer {
    /// Make the next delivery fail. One-shot.
    pub fn fail_next_delivery(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Everything delivered so far, as `(kind, recipient, code)`.
    pub async fn sent(&self) -> Vec<(EmailKind, String, String)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_otp(&self, kind: EmailKind, to: &str, code: &str) -> Result<(), EmailError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(EmailError::InvalidAddress(to.to_owned()));
        }
        self.sent
            .lock()
            .await
            .push((kind, to.to_owned(), code.to_owned()));
        Ok(())
    }
}
