//! Chapa hosted-checkout adapter.
//!
//! Initializes a transaction over HTTPS and returns the checkout URL Chapa
//! hands back. The intent's idempotency key is used as `tx_ref`, so a webhook
//! that only echoes `tx_ref` still resolves to the intent.
//!
//! Request building and response parsing are pure functions; only
//! `initiate` touches the network.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

use crate::domain::payment::{CheckoutHandle, ProviderId};
use crate::ports::{IntentContext, ProviderAdapter, ProviderError};

const INITIALIZE_PATH: &str = "/v1/transaction/initialize";

/// Chapa API configuration.
#[derive(Clone)]
pub struct ChapaConfig {
    /// Secret API key (CHASECK_...).
    pub secret_key: SecretString,
    /// Base URL for the API (default: https://api.chapa.co).
    pub api_base_url: String,
    /// Used when the caller has no email on record.
    pub default_customer_email: String,
    /// Used when the caller has no display name on record.
    pub default_first_name: String,
    /// Client timeout for the initialize call.
    pub timeout: Duration,
}

/// Body of `POST /v1/transaction/initialize`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitializeRequest {
    pub amount: String,
    pub currency: String,
    pub email: String,
    pub first_name: String,
    pub tx_ref: String,
    pub callback_url: String,
    pub return_url: String,
    pub meta: JsonValue,
}

/// Chapa API adapter.
pub struct ChapaAdapter {
    config: ChapaConfig,
    http_client: reqwest::Client,
}

impl ChapaAdapter {
    pub fn new(config: ChapaConfig) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::configuration(ProviderId::Chapa, e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn initialize_url(&self) -> String {
        format!(
            "{}{}",
            self.config.api_base_url.trim_end_matches('/'),
            INITIALIZE_PATH
        )
    }
}

/// Builds the initialize body for an intent.
pub fn build_initialize_request(config: &ChapaConfig, ctx: &IntentContext) -> InitializeRequest {
    let email = ctx
        .customer_email
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or(&config.default_customer_email)
        .to_string();
    let first_name = ctx
        .customer_name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(&config.default_first_name)
        .to_string();

    InitializeRequest {
        amount: ctx.amount.major_units(),
        currency: ctx.amount.currency().to_string(),
        email,
        first_name,
        tx_ref: ctx.idempotency_key.as_str().to_string(),
        callback_url: ctx.return_url.clone(),
        return_url: ctx.return_url.clone(),
        meta: json!({ "intent_id": ctx.intent_id.to_string() }),
    }
}

/// Turns an initialize response into a checkout handle.
///
/// Any non-success HTTP status is a rejection carrying Chapa's `message`.
/// A success without `data.checkout_url` is an invalid response.
pub fn parse_initialize_response(
    http_success: bool,
    body: JsonValue,
) -> Result<CheckoutHandle, ProviderError> {
    if !http_success {
        let message = body
            .get("message")
            .map(|m| match m {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| "initialize failed".to_string());
        return Err(ProviderError::rejected(ProviderId::Chapa, message));
    }

    let checkout_url = body
        .pointer("/data/checkout_url")
        .and_then(JsonValue::as_str)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ProviderError::invalid_response(ProviderId::Chapa, "missing data.checkout_url")
        })?;

    Ok(CheckoutHandle {
        redirect_url: Some(checkout_url),
        client_secret: None,
        provider_payload: body,
    })
}

#[async_trait]
impl ProviderAdapter for ChapaAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::Chapa
    }

    async fn initiate(&self, ctx: &IntentContext) -> Result<CheckoutHandle, ProviderError> {
        let request = build_initialize_request(&self.config, ctx);

        let response = self
            .http_client
            .post(self.initialize_url())
            .bearer_auth(self.config.secret_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(intent_id = %ctx.intent_id, error = %e, "chapa initialize unreachable");
                ProviderError::network(ProviderId::Chapa, e.to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::network(ProviderId::Chapa, e.to_string()))?;

        let body: JsonValue = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(_) if !status.is_success() => json!({ "message": status.to_string() }),
            Err(e) => {
                return Err(ProviderError::invalid_response(
                    ProviderId::Chapa,
                    format!("response is not JSON: {}", e),
                ))
            }
        };

        let result = parse_initialize_response(status.is_success(), body);
        if let Err(err) = &result {
            tracing::warn!(
                intent_id = %ctx.intent_id,
                http_status = status.as_u16(),
                error = %err,
                "chapa initialize rejected"
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::providers::test_support::context;
    use crate::ports::ProviderErrorCode;

    fn config() -> ChapaConfig {
        ChapaConfig {
            secret_key: SecretString::new("CHASECK_TEST".to_string()),
            api_base_url: "https://api.chapa.co/".to_string(),
            default_customer_email: "user@yenefresh.com".to_string(),
            default_first_name: "YeneFresh".to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    // ══════════════════════════════════════════════════════════════════
    // Request
    // ══════════════════════════════════════════════════════════════════

    #[test]
    fn request_uses_idempotency_key_as_tx_ref() {
        let ctx = context(5000, "ETB");
        let request = build_initialize_request(&config(), &ctx);

        assert_eq!(request.tx_ref, ctx.idempotency_key.as_str());
        assert_eq!(request.amount, "50.00");
        assert_eq!(request.currency, "ETB");
        assert_eq!(request.meta["intent_id"], ctx.intent_id.to_string());
        assert_eq!(request.return_url, ctx.return_url);
    }

    #[test]
    fn request_falls_back_to_default_customer() {
        let mut ctx = context(5000, "ETB");
        ctx.customer_email = Some("  ".to_string());
        ctx.customer_name = None;

        let request = build_initialize_request(&config(), &ctx);

        assert_eq!(request.email, "user@yenefresh.com");
        assert_eq!(request.first_name, "YeneFresh");
    }

    #[test]
    fn request_prefers_caller_identity() {
        let mut ctx = context(5000, "ETB");
        ctx.customer_email = Some("abebe@example.com".to_string());
        ctx.customer_name = Some("Abebe".to_string());

        let request = build_initialize_request(&config(), &ctx);

        assert_eq!(request.email, "abebe@example.com");
        assert_eq!(request.first_name, "Abebe");
    }

    #[test]
    fn initialize_url_tolerates_trailing_slash() {
        let adapter = ChapaAdapter::new(config()).unwrap();
        assert_eq!(
            adapter.initialize_url(),
            "https://api.chapa.co/v1/transaction/initialize"
        );
    }

    // ══════════════════════════════════════════════════════════════════
    // Response
    // ══════════════════════════════════════════════════════════════════

    #[test]
    fn success_yields_checkout_url_and_keeps_whole_body() {
        let body = json!({
            "message": "Hosted Link",
            "status": "success",
            "data": { "checkout_url": "https://checkout.chapa.co/checkout/payment/abc" }
        });

        let handle = parse_initialize_response(true, body.clone()).unwrap();

        assert_eq!(
            handle.redirect_url.as_deref(),
            Some("https://checkout.chapa.co/checkout/payment/abc")
        );
        assert_eq!(handle.provider_payload, body);
    }

    #[test]
    fn non_success_is_rejected_with_provider_message() {
        let err = parse_initialize_response(false, json!({ "message": "Invalid currency" }))
            .unwrap_err();

        assert_eq!(err.code, ProviderErrorCode::Rejected);
        assert_eq!(err.message, "Invalid currency");
    }

    #[test]
    fn structured_rejection_message_is_rendered() {
        let err = parse_initialize_response(false, json!({ "message": { "email": ["invalid"] } }))
            .unwrap_err();
        assert!(err.message.contains("email"));
    }

    #[test]
    fn success_without_checkout_url_is_invalid() {
        let err = parse_initialize_response(true, json!({ "status": "success", "data": null }))
            .unwrap_err();
        assert_eq!(err.code, ProviderErrorCode::InvalidResponse);
    }
}
