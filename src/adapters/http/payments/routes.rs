//! Axum router for payment endpoints.

use axum::{routing::post, Router};

use super::handlers::{create_intent, PaymentsAppState};

/// Routes mounted at `/api/payments`.
pub fn payment_routes() -> Router<PaymentsAppState> {
    Router::new().route("/intents", post(create_intent))
}
