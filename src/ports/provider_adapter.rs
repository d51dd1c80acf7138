//! ProviderAdapter port - starting a checkout with one payment rail.
//!
//! Adapters translate an intent into whatever the rail needs and hand back a
//! `CheckoutHandle`. They never touch the store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId, PaymentIntentId};
use crate::domain::payment::{CheckoutHandle, IdempotencyKey, Money, ProviderId};

/// Everything an adapter may need about the intent it is initiating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentContext {
    pub order_id: OrderId,
    pub intent_id: PaymentIntentId,
    pub amount: Money,
    pub idempotency_key: IdempotencyKey,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    /// Where the provider sends the shopper after checkout.
    pub return_url: String,
}

#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Which rail this adapter speaks for.
    fn provider(&self) -> ProviderId;

    /// Starts a checkout. One attempt; no retries.
    async fn initiate(&self, ctx: &IntentContext) -> Result<CheckoutHandle, ProviderError>;
}

/// Provider id to adapter, built once at startup.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    adapters: HashMap<ProviderId, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an adapter under the provider it reports.
    pub fn with(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.register(adapter);
        self
    }

    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.insert(adapter.provider(), adapter);
    }

    pub fn get(&self, provider: ProviderId) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.get(&provider).cloned()
    }

    /// Registered providers in canonical order.
    pub fn providers(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|p| self.adapters.contains_key(p))
            .collect()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers())
            .finish()
    }
}

/// Provider failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorCode {
    /// Connection failure or timeout.
    Network,
    /// The provider answered and said no.
    Rejected,
    /// The provider answered with something we could not use.
    InvalidResponse,
    /// Missing credentials or unusable settings on our side.
    Configuration,
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProviderErrorCode::Network => "network_error",
            ProviderErrorCode::Rejected => "provider_rejected",
            ProviderErrorCode::InvalidResponse => "invalid_response",
            ProviderErrorCode::Configuration => "configuration_error",
        };
        f.write_str(s)
    }
}

/// Error raised by an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub code: ProviderErrorCode,
    pub message: String,
    pub provider: ProviderId,
}

impl ProviderError {
    pub fn new(provider: ProviderId, code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider,
        }
    }

    pub fn network(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorCode::Network, message)
    }

    pub fn rejected(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorCode::Rejected, message)
    }

    pub fn invalid_response(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorCode::InvalidResponse, message)
    }

    pub fn configuration(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorCode::Configuration, message)
    }

    /// Only transport failures are worth another attempt by the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self.code, ProviderErrorCode::Network)
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.provider.as_str(), self.code, self.message)
    }
}

impl std::error::Error for ProviderError {}

impl From<ProviderError> for DomainError {
    fn from(err: ProviderError) -> Self {
        DomainError::new(ErrorCode::InternalError, err.to_string())
            .with_detail("provider", err.provider.as_str())
            .with_detail("provider_error", err.code.to_string())
    }
}
