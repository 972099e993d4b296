//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` that captures server-side failures to
//! Sentry before responding. All route handlers return `Result<T, AppError>`
//! and clients always receive a JSON `{"error": ...}` body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::otp::OtpError;
use crate::services::queue::QueueError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing required input. User-fixable.
    #[error("validation error: {0}")]
    Validation(String),

    /// Referenced entity absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate unique field (e.g., email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// OTP absent, expired, mismatched, or the secret store failed.
    #[error("otp error: {0}")]
    Otp(#[from] OtpError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(RepositoryError),

    /// Task queue operation failed.
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Repository(other),
        }
    }
}

impl From<crate::services::orders::OrderError> for AppError {
    fn from(err: crate::services::orders::OrderError) -> Self {
        use crate::services::orders::OrderError;
        match err {
            OrderError::Validation(msg) => Self::Validation(msg),
            OrderError::TableNotFound(_) => Self::NotFound("Table not found".to_owned()),
            OrderError::FoodNotFound(_) => Self::NotFound("Food not found".to_owned()),
            OrderError::Repository(e) => e.into(),
        }
    }
}

impl From<crate::services::billing::BillingError> for AppError {
    fn from(err: crate::services::billing::BillingError) -> Self {
        match err {
            crate::services::billing::BillingError::Repository(e) => e.into(),
        }
    }
}

impl From<crate::services::otp::OtpStoreError> for AppError {
    fn from(err: crate::services::otp::OtpStoreError) -> Self {
        Self::Otp(OtpError::Store(err))
    }
}

impl From<crate::services::password::PasswordHashError> for AppError {
    fn from(err: crate::services::password::PasswordHashError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<tableside_core::EmailError> for AppError {
    fn from(err: tableside_core::EmailError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<tableside_core::OtpCodeError> for AppError {
    fn from(err: tableside_core::OtpCodeError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl AppError {
    /// Whether this error is a server-side failure worth capturing.
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Repository(_) | Self::Queue(_) | Self::Internal(_) | Self::Otp(OtpError::Store(_))
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Otp(err) => match err {
                OtpError::Missing | OtpError::Mismatch => StatusCode::UNAUTHORIZED,
                OtpError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Repository(_) | Self::Queue(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Validation and not-found errors are surfaced verbatim; internal
        // details never reach the client.
        let message = match &self {
            Self::Validation(msg) | Self::NotFound(msg) | Self::Conflict(msg) => msg.clone(),
            Self::Otp(err) => match err {
                OtpError::Missing => "Invalid or expired OTP".to_owned(),
                OtpError::Mismatch => "Invalid OTP".to_owned(),
                OtpError::Store(_) => "Internal server error".to_owned(),
            },
            Self::Repository(_) | Self::Queue(_) | Self::Internal(_) => {
                "Internal server error".to_owned()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
