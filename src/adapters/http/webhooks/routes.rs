//! Axum router for provider callbacks.

use axum::{routing::post, Router};

use super::handlers::{receive_webhook, WebhooksAppState};

/// Routes mounted at `/api/webhooks`. No session auth: callbacks are
/// authenticated by their body signature.
pub fn webhook_routes() -> Router<WebhooksAppState> {
    Router::new().route("/:provider", post(receive_webhook))
}
