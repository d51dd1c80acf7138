//! IntentStore port - durable home of orders and payment intents.
//!
//! The store is the only shared mutable resource in the engine. Its writes
//! carry the engine's safety guarantees:
//!
//! - `create_order_with_intent` enforces idempotency-key uniqueness. A replay
//!   reports the stored intent instead of writing a second pair.
//! - `attach_checkout` writes only while the intent is still `created`.
//! - `mark_intent_status` applies a reconciled status only while the intent
//!   is `created` or `pending`, atomically with the check.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, PaymentIntentId};
use crate::domain::payment::{CheckoutHandle, IntentStatus, Order, PaymentIntent, StatusUpdate};

/// Result of a create call.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    /// The order and intent were written.
    Created,
    /// The idempotency key was already taken; this is the stored intent.
    Existing(PaymentIntent),
}

/// Gateway failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable(message.into())
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        StoreError::Corrupt(message.into())
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        let code = match &err {
            StoreError::NotFound(_) => ErrorCode::IntentNotFound,
            _ => ErrorCode::DatabaseError,
        };
        DomainError::new(code, err.to_string())
    }
}

/// Port for order and intent persistence.
#[async_trait]
pub trait IntentStore: Send + Sync {
    /// Writes the order, its line items and its intent in one transaction.
    ///
    /// When `intent.idempotency_key` already exists nothing is written and the
    /// stored intent is returned.
    async fn create_order_with_intent(
        &self,
        order: &Order,
        intent: &PaymentIntent,
    ) -> Result<CreateOutcome, StoreError>;

    /// Records an adapter's checkout handle and the resulting status.
    ///
    /// Applies only while the intent is still `created`, in the same statement
    /// as the check. An intent a callback has already moved keeps its status
    /// and payload. Returns the status the intent holds afterwards.
    async fn attach_checkout(
        &self,
        intent_id: &PaymentIntentId,
        handle: &CheckoutHandle,
        status: IntentStatus,
    ) -> Result<IntentStatus, StoreError>;

    /// Notes why checkout initiation failed, so a resubmit with the same key
    /// retries the provider. Ignored once the intent has left `created`.
    async fn record_initiation_failure(
        &self,
        intent_id: &PaymentIntentId,
        reason: &str,
    ) -> Result<(), StoreError>;

    /// Applies a reconciled status to the intent named by `reference`.
    ///
    /// `reference` is matched against the intent id, then the idempotency key.
    /// Returns `StoreError::NotFound` when neither matches. A final intent is
    /// left untouched and reported as `StatusUpdate::Unchanged`.
    async fn mark_intent_status(
        &self,
        reference: &str,
        status: IntentStatus,
        provider_response: JsonValue,
        provider_txn_id: Option<String>,
    ) -> Result<StatusUpdate, StoreError>;

    /// Looks an intent up by id or idempotency key.
    async fn find_intent(&self, reference: &str) -> Result<Option<PaymentIntent>, StoreError>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn IntentStore) {}

    #[test]
    fn only_unavailable_is_transient() {
        assert!(StoreError::unavailable("pool timed out").is_transient());
        assert!(!StoreError::corrupt("bad status").is_transient());
        assert!(!StoreError::NotFound("abc".into()).is_transient());
    }

    #[test]
    fn not_found_maps_to_intent_not_found() {
        let err: DomainError = StoreError::NotFound("abc".into()).into();
        assert_eq!(err.code, ErrorCode::IntentNotFound);

        let err: DomainError = StoreError::Constraint("fk".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
