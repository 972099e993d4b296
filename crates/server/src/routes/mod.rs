//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (pings the database)
//!
//! # Orders
//! POST /order-items                - Place an order with its items
//! GET  /order-items/order/{id}     - Billing report for an order
//!
//! # Accounts
//! POST /users/signup               - Register an account, queue a verification OTP
//! POST /users/verify-otp           - Verify the emailed OTP
//! POST /users/forgot-password      - Queue a password-reset OTP
//! POST /users/reset-password       - Set a new password after OTP verification
//! ```

pub mod health;
pub mod order_items;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the API router. Middleware layers are applied by the caller.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .route("/order-items", post(order_items::create))
        .route("/order-items/order/{order_id}", get(order_items::bill))
        .route("/users/signup", post(users::signup))
        .route("/users/verify-otp", post(users::verify_otp))
        .route("/users/forgot-password", post(users::forgot_password))
        .route("/users/reset-password", post(users::reset_password))
}
