//! ReconcileWebhookHandler - applies a provider callback to its intent.
//!
//! Order matters: the signature is checked over the raw bytes before the body
//! is parsed, so the command carries bytes and never a parsed value.

use std::collections::HashMap;
use std::sync::Arc;

use secrecy::SecretString;
use serde_json::Value as JsonValue;

use crate::domain::payment::{
    ProviderId, StatusUpdate, WebhookError, WebhookProfile, WebhookSignatureVerifier,
};
use crate::ports::{IntentStore, StoreError};

/// A callback exactly as it arrived.
#[derive(Debug, Clone)]
pub struct ReconcileWebhookCommand {
    pub provider: ProviderId,
    /// Unparsed request body.
    pub raw_body: Vec<u8>,
    /// Value of the provider's signature header, if present.
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileWebhookResult {
    /// The reference the callback named (intent id or idempotency key).
    pub reference: String,
    pub update: StatusUpdate,
}

pub struct ReconcileWebhookHandler {
    store: Arc<dyn IntentStore>,
    verifiers: HashMap<ProviderId, WebhookSignatureVerifier>,
}

impl ReconcileWebhookHandler {
    pub fn new(store: Arc<dyn IntentStore>) -> Self {
        Self {
            store,
            verifiers: HashMap::new(),
        }
    }

    /// Enables callbacks for `provider`, verified with `secret` in the
    /// encoding its profile declares. Providers without a profile are ignored.
    pub fn with_secret(mut self, provider: ProviderId, secret: SecretString) -> Self {
        if let Some(profile) = WebhookProfile::for_provider(provider) {
            self.verifiers
                .insert(provider, WebhookSignatureVerifier::new(secret, profile.encoding));
        }
        self
    }

    pub fn accepts(&self, provider: ProviderId) -> bool {
        self.verifiers.contains_key(&provider)
    }

    pub async fn handle(
        &self,
        cmd: ReconcileWebhookCommand,
    ) -> Result<ReconcileWebhookResult, WebhookError> {
        let provider = cmd.provider;
        let (profile, verifier) = WebhookProfile::for_provider(provider)
            .zip(self.verifiers.get(&provider))
            .ok_or_else(|| WebhookError::UnsupportedProvider(provider.as_str().to_string()))?;

        // 1. Authenticate the bytes
        let verified = cmd
            .signature
            .as_deref()
            .map(|sig| verifier.verify(&cmd.raw_body, sig))
            .unwrap_or(false);
        if !verified {
            tracing::warn!(
                provider = %provider,
                signature_present = cmd.signature.is_some(),
                body_len = cmd.raw_body.len(),
                "webhook signature rejected"
            );
            return Err(WebhookError::InvalidSignature);
        }

        // 2. Parse
        let payload: JsonValue = serde_json::from_slice(&cmd.raw_body)
            .map_err(|e| WebhookError::malformed(e.to_string()))?;

        // 3. Resolve and map
        let reference = profile
            .intent_reference(&payload)
            .ok_or(WebhookError::UnresolvableIntent)?;
        let status = profile.status_of(&payload);
        let txn_id = profile.provider_txn_id(&payload);

        // 4. Apply
        let update = self
            .store
            .mark_intent_status(&reference, status, payload, txn_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => WebhookError::IntentNotFound(reference.clone()),
                other => {
                    tracing::error!(provider = %provider, reference = %reference, error = %other, "webhook store failure");
                    WebhookError::store(other.to_string())
                }
            })?;

        match update {
            StatusUpdate::Applied { from, to } => {
                tracing::info!(provider = %provider, reference = %reference, %from, %to, "intent reconciled");
            }
            StatusUpdate::Unchanged { current } if current == status => {
                tracing::info!(provider = %provider, reference = %reference, status = %current, "duplicate webhook ignored");
            }
            StatusUpdate::Unchanged { current } => {
                tracing::warn!(
                    provider = %provider,
                    reference = %reference,
                    current = %current,
                    refused = %status,
                    "webhook tried to move a final intent"
                );
            }
        }

        Ok(ReconcileWebhookResult { reference, update })
    }
}
