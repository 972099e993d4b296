//! Health and readiness handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::state::AppState;

/// Liveness check. Always responds once the process serves traffic.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Readiness check. Pings the database when one is wired.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if let Some(pool) = state.pool()
        && let Err(e) = sqlx::query("SELECT 1").execute(pool).await
    {
        tracing::warn!(error = %e, "Readiness check failed");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable" })),
        );
    }

    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
