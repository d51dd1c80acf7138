//! HTTP handlers for provider callbacks.
//!
//! Responses are plain text because providers log them verbatim and some
//! retry on anything that is not a 2xx.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::handlers::payment::{ReconcileWebhookCommand, ReconcileWebhookHandler};
use crate::domain::payment::{ProviderId, WebhookError, WebhookProfile};

/// Dependencies of the webhook routes.
#[derive(Clone)]
pub struct WebhooksAppState {
    pub reconciler: Arc<ReconcileWebhookHandler>,
}

/// POST /api/webhooks/:provider - Reconcile a provider callback
pub async fn receive_webhook(
    State(state): State<WebhooksAppState>,
    Path(provider): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let profile = provider
        .parse::<ProviderId>()
        .ok()
        .filter(|p| state.reconciler.accepts(*p))
        .and_then(WebhookProfile::for_provider);
    let Some(profile) = profile else {
        let err = WebhookError::UnsupportedProvider(provider);
        return (err.status_code(), err.to_string()).into_response();
    };

    let cmd = ReconcileWebhookCommand {
        provider: profile.provider,
        raw_body: body.to_vec(),
        signature: signature_header(&headers, profile.signature_headers),
    };

    match state.reconciler.handle(cmd).await {
        Ok(_) => (StatusCode::OK, "ok").into_response(),
        Err(err @ WebhookError::Store(_)) => (
            err.status_code(),
            format!("{} webhook error: {}", profile.provider, err),
        )
            .into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

/// First non-empty header among `names`.
fn signature_header(headers: &HeaderMap, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    })
}
