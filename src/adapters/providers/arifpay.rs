//! Arifpay wallet adapter. Placeholder checkout until the init endpoint lands.

use async_trait::async_trait;
use serde_json::json;

use crate::domain::payment::{CheckoutHandle, ProviderId};
use crate::ports::{IntentContext, ProviderAdapter, ProviderError};

#[derive(Clone)]
pub struct ArifpayConfig {
    pub public_key: String,
    pub placeholder_base: String,
}

pub struct ArifpayAdapter {
    config: ArifpayConfig,
}

impl ArifpayAdapter {
    pub fn new(config: ArifpayConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProviderAdapter for ArifpayAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::Arifpay
    }

    async fn initiate(&self, ctx: &IntentContext) -> Result<CheckoutHandle, ProviderError> {
        let redirect_url = format!(
            "{}/arifpay/checkout?ref={}",
            self.config.placeholder_base.trim_end_matches('/'),
            ctx.intent_id
        );

        Ok(CheckoutHandle {
            redirect_url: Some(redirect_url),
            client_secret: None,
            provider_payload: json!({
                "pk": self.config.public_key,
                "ref": ctx.intent_id.to_string(),
                "amount": ctx.amount.major_units(),
                "currency": ctx.amount.currency(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::providers::test_support::context;

    #[tokio::test]
    async fn stub_checkout_carries_public_key_and_reference() {
        let adapter = ArifpayAdapter::new(ArifpayConfig {
            public_key: "pk_test".to_string(),
            placeholder_base: "https://example.com".to_string(),
        });
        let ctx = context(12345, "ETB");

        let handle = adapter.initiate(&ctx).await.unwrap();

        assert!(handle
            .redirect_url
            .unwrap()
            .ends_with(&format!("/arifpay/checkout?ref={}", ctx.intent_id)));
        assert_eq!(handle.provider_payload["pk"], "pk_test");
        assert_eq!(handle.provider_payload["amount"], "123.45");
    }
}
