//! Telebirr wallet adapter.
//!
//! The merchant API is not wired yet: the adapter builds the documented
//! payload and hands back a deterministic placeholder checkout link so the
//! full flow can be exercised end to end.

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::json;

use crate::domain::payment::{CheckoutHandle, ProviderId};
use crate::ports::{IntentContext, ProviderAdapter, ProviderError};

/// Telebirr merchant credentials.
#[derive(Clone)]
pub struct TelebirrConfig {
    pub app_id: String,
    pub merchant_id: String,
    /// Payload signing key. Unused until the live endpoint is integrated.
    pub app_key: SecretString,
    /// Base of the placeholder checkout link.
    pub placeholder_base: String,
}

pub struct TelebirrAdapter {
    config: TelebirrConfig,
}

impl TelebirrAdapter {
    pub fn new(config: TelebirrConfig) -> Self {
        Self { config }
    }

    fn checkout_url(&self, ctx: &IntentContext) -> String {
        format!(
            "{}/telebirr/checkout?ref={}",
            self.config.placeholder_base.trim_end_matches('/'),
            ctx.intent_id
        )
    }
}

#[async_trait]
impl ProviderAdapter for TelebirrAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::Telebirr
    }

    async fn initiate(&self, ctx: &IntentContext) -> Result<CheckoutHandle, ProviderError> {
        let payload = json!({
            "appId": self.config.app_id,
            "merchantId": self.config.merchant_id,
            "amount": ctx.amount.major_units(),
            "currency": ctx.amount.currency(),
            "reference": ctx.intent_id.to_string(),
            "returnUrl": ctx.return_url,
        });

        tracing::debug!(intent_id = %ctx.intent_id, "telebirr checkout prepared");

        Ok(CheckoutHandle {
            redirect_url: Some(self.checkout_url(ctx)),
            client_secret: None,
            provider_payload: payload,
        })
    }
}
