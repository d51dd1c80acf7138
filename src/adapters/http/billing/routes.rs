//! Axum router for the billing trigger.

use axum::{routing::post, Router};

use super::handlers::{run_billing, BillingAppState};

/// Routes mounted at `/api/billing`.
pub fn billing_routes() -> Router<BillingAppState> {
    Router::new().route("/run", post(run_billing))
}
