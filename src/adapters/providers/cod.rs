//! Cash on delivery. Nothing to initiate; the courier collects.

use async_trait::async_trait;
use serde_json::json;

use crate::domain::payment::{CheckoutHandle, ProviderId};
use crate::ports::{IntentContext, ProviderAdapter, ProviderError};

#[derive(Debug, Default, Clone, Copy)]
pub struct CashOnDeliveryAdapter;

#[async_trait]
impl ProviderAdapter for CashOnDeliveryAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::Cod
    }

    async fn initiate(&self, _ctx: &IntentContext) -> Result<CheckoutHandle, ProviderError> {
        Ok(CheckoutHandle {
            redirect_url: None,
            client_secret: None,
            provider_payload: json!({ "note": "cash_on_delivery" }),
        })
    }
}
