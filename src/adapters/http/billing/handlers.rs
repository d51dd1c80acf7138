//! HTTP handler that triggers a billing sweep.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::application::handlers::billing::{RunBillingSweepCommand, RunBillingSweepHandler};
use crate::domain::foundation::Timestamp;

pub const CRON_KEY_HEADER: &str = "x-cron-key";

/// Dependencies of the billing routes.
#[derive(Clone)]
pub struct BillingAppState {
    pub sweep: Arc<RunBillingSweepHandler>,
    /// Required in `X-Cron-Key` for live sweeps when set.
    pub trigger_key: Option<SecretString>,
}

impl BillingAppState {
    fn authorized(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = &self.trigger_key else {
            return true;
        };
        if !self.sweep.run_mode().is_live() {
            return true;
        }
        let presented = headers
            .get(CRON_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        presented
            .as_bytes()
            .ct_eq(expected.expose_secret().as_bytes())
            .into()
    }
}

/// POST /api/billing/run - Run one sweep as of now
pub async fn run_billing(State(state): State<BillingAppState>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        tracing::warn!("billing trigger rejected: bad cron key");
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "ok": false, "error": "forbidden: bad cron key" })),
        )
            .into_response();
    }

    let cmd = RunBillingSweepCommand {
        now: Timestamp::now(),
    };

    match state.sweep.handle(cmd).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "ok": false, "step": err.step, "error": err.message })),
        )
            .into_response(),
    }
}
