//! Liveness and readiness probes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::ports::IntentStore;

#[derive(Clone)]
pub struct HealthAppState {
    pub store: Arc<dyn IntentStore>,
}

/// GET /health - The process is serving requests
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "up", "version": env!("CARGO_PKG_VERSION") }))
}

/// GET /ready - The store answers
pub async fn ready(State(state): State<HealthAppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "error": e.to_string() })),
            )
        }
    }
}

pub fn health_routes() -> Router<HealthAppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
}
