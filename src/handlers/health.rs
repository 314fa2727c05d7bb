//! Liveness and readiness probes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;
use tracing::warn;

use crate::AppState;

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness includes a round trip to the upstream data API.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.supabase.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ready", "upstream": "ok" })),
        ),
        Err(err) => {
            warn!(error = %err, "readiness probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "not_ready", "upstream": "unreachable" })),
            )
        }
    }
}
