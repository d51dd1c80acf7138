//! CreateIntentHandler - Command handler for starting a payment.
//!
//! Writes one order and one intent, asks the provider adapter for a checkout
//! handle, and records it. Interactive callers and the billing sweep share
//! this path.

use serde::Serialize;

use crate::domain::foundation::{
    AddressId, AuthenticatedUser, DeliveryWindowId, OrderId, PaymentIntentId, PaymentMethodId,
    Timestamp,
};
use crate::domain::payment::{
    IdempotencyKey, IntentError, IntentStatus, LineItem, Money, Order, PaymentIntent, ProviderId,
    DEFAULT_PURPOSE,
};
use crate::ports::{CreateOutcome, IntentContext, IntentStore, ProviderAdapter, ProviderRegistry};

use std::sync::Arc;

/// Command to create an order and its payment intent.
#[derive(Debug, Clone)]
pub struct CreateIntentCommand {
    /// `None` when the request carried no valid session.
    pub caller: Option<AuthenticatedUser>,
    pub amount_cents: i64,
    pub currency: String,
    pub provider_id: String,
    /// Saved method the caller paid with. Recorded in logs only.
    pub method_id: Option<PaymentMethodId>,
    pub address_id: AddressId,
    pub delivery_window_id: DeliveryWindowId,
    pub purpose: Option<String>,
    pub idempotency_key: Option<String>,
    pub selected_recipes: Vec<String>,
    pub quantities: Vec<i64>,
}

/// What the caller needs to continue checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateIntentResult {
    pub order_id: OrderId,
    pub intent_id: PaymentIntentId,
    pub status: IntentStatus,
    pub client_secret: Option<String>,
    pub redirect_url: Option<String>,
    /// True when the idempotency key had already been used.
    pub replayed: bool,
}

impl CreateIntentResult {
    fn replay_of(intent: &PaymentIntent) -> Self {
        Self {
            order_id: intent.order_id,
            intent_id: intent.id,
            status: intent.status,
            client_secret: intent.client_secret.clone(),
            redirect_url: intent.redirect_url.clone(),
            replayed: true,
        }
    }
}

pub struct CreateIntentHandler {
    store: Arc<dyn IntentStore>,
    providers: ProviderRegistry,
    return_url: String,
}

impl CreateIntentHandler {
    pub fn new(
        store: Arc<dyn IntentStore>,
        providers: ProviderRegistry,
        return_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            providers,
            return_url: return_url.into(),
        }
    }

    pub async fn handle(&self, cmd: CreateIntentCommand) -> Result<CreateIntentResult, IntentError> {
        // 1. Caller and input
        let caller = cmd.caller.ok_or(IntentError::Unauthorized)?;
        let total = Money::new(cmd.amount_cents, &cmd.currency)?;
        let line_items = LineItem::zip(cmd.selected_recipes, cmd.quantities)?;
        let idempotency_key = match cmd.idempotency_key.filter(|k| !k.trim().is_empty()) {
            Some(key) => IdempotencyKey::parse(key)?,
            None => IdempotencyKey::generate(),
        };

        // 2. Adapter before any write, so an unknown provider leaves nothing behind
        let provider: ProviderId = cmd.provider_id.parse()?;
        let adapter = self
            .providers
            .get(provider)
            .ok_or_else(|| IntentError::unknown_provider(provider.as_str()))?;

        // 3. Order and intent, atomically
        let order = Order {
            id: OrderId::new(),
            user_id: caller.id.clone(),
            total,
            line_items,
            address_id: cmd.address_id,
            delivery_window_id: cmd.delivery_window_id,
            purpose: cmd
                .purpose
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PURPOSE.to_string()),
            created_at: Timestamp::now(),
        };
        let intent = PaymentIntent::for_order(&order, provider, idempotency_key);

        let outcome = self
            .store
            .create_order_with_intent(&order, &intent)
            .await
            .map_err(|e| {
                tracing::warn!(provider = %provider, error = %e, "order/intent write rejected");
                IntentError::store(e.to_string())
            })?;

        if let CreateOutcome::Existing(existing) = outcome {
            if existing.user_id != caller.id {
                tracing::warn!(
                    intent_id = %existing.id,
                    "idempotency key replayed by a different user"
                );
                return Err(IntentError::KeyConflict);
            }
            if !existing.needs_checkout_retry() {
                return Ok(CreateIntentResult::replay_of(&existing));
            }

            // The earlier initiation failed; ask the provider again under the stored ids.
            let adapter = self
                .providers
                .get(existing.provider)
                .ok_or_else(|| IntentError::unknown_provider(existing.provider.as_str()))?;
            tracing::info!(intent_id = %existing.id, "resuming checkout for replayed key");
            let result = self
                .checkout(adapter.as_ref(), &existing, &caller, cmd.method_id)
                .await?;
            return Ok(CreateIntentResult {
                replayed: true,
                ..result
            });
        }

        self.checkout(adapter.as_ref(), &intent, &caller, cmd.method_id)
            .await
    }

    /// Asks the adapter for a checkout handle and records it on the intent.
    async fn checkout(
        &self,
        adapter: &dyn ProviderAdapter,
        intent: &PaymentIntent,
        caller: &AuthenticatedUser,
        method_id: Option<PaymentMethodId>,
    ) -> Result<CreateIntentResult, IntentError> {
        let provider = intent.provider;
        let ctx = IntentContext {
            order_id: intent.order_id,
            intent_id: intent.id,
            amount: intent.amount.clone(),
            idempotency_key: intent.idempotency_key.clone(),
            customer_email: caller.email.clone(),
            customer_name: caller.display_name.clone(),
            return_url: self.return_url.clone(),
        };

        let handle = match adapter.initiate(&ctx).await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(
                    intent_id = %intent.id,
                    provider = %provider,
                    error = %e,
                    "provider initiation failed"
                );
                let reason = e.to_string();
                if let Err(store_err) = self
                    .store
                    .record_initiation_failure(&intent.id, &reason)
                    .await
                {
                    tracing::warn!(
                        intent_id = %intent.id,
                        error = %store_err,
                        "failed to note initiation failure"
                    );
                }
                return Err(IntentError::provider_init(reason));
            }
        };

        // Record the handle; the caller gets it either way
        let requested = PaymentIntent::status_after_checkout(provider);
        let status = match self.store.attach_checkout(&intent.id, &handle, requested).await {
            Ok(status) => status,
            Err(e) => {
                tracing::error!(
                    intent_id = %intent.id,
                    error = %e,
                    "failed to record checkout handle"
                );
                requested
            }
        };
        if status != requested {
            tracing::info!(
                intent_id = %intent.id,
                status = %status,
                "intent reconciled before its checkout handle was recorded"
            );
        }

        tracing::info!(
            intent_id = %intent.id,
            order_id = %intent.order_id,
            provider = %provider,
            method_id = ?method_id,
            status = %status,
            "payment intent created"
        );

        Ok(CreateIntentResult {
            order_id: intent.order_id,
            intent_id: intent.id,
            status,
            client_secret: handle.client_secret,
            redirect_url: handle.redirect_url,
            replayed: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryIntentStore;
    use crate::domain::foundation::UserId;
    use crate::domain::payment::CheckoutHandle;
    use crate::ports::{ProviderError, StoreError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct MockAdapter {
        provider: ProviderId,
        calls: Mutex<Vec<IntentContext>>,
        failures_left: Mutex<usize>,
    }

    impl MockAdapter {
        fn new(provider: ProviderId) -> Self {
            Self {
                provider,
                calls: Mutex::new(Vec::new()),
                failures_left: Mutex::new(0),
            }
        }

        fn failing(provider: ProviderId) -> Self {
            Self::failing_times(provider, usize::MAX)
        }

        fn failing_times(provider: ProviderId, times: usize) -> Self {
            Self {
                failures_left: Mutex::new(times),
                ..Self::new(provider)
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ProviderAdapter for MockAdapter {
        fn provider(&self) -> ProviderId {
            self.provider
        }

        async fn initiate(&self, ctx: &IntentContext) -> Result<CheckoutHandle, ProviderError> {
            self.calls.lock().unwrap().push(ctx.clone());
            let mut failures_left = self.failures_left.lock().unwrap();
            if *failures_left > 0 {
                *failures_left -= 1;
                return Err(ProviderError::network(self.provider, "connection reset"));
            }
            Ok(CheckoutHandle {
                redirect_url: Some(format!("https://pay.test/{}", ctx.intent_id)),
                client_secret: Some("secret-1".to_string()),
                provider_payload: json!({ "ok": true }),
            })
        }
    }

    /// Rail whose callback lands while `initiate` is still in flight.
    struct SettlesDuringInitiate {
        store: Arc<InMemoryIntentStore>,
    }

    #[async_trait]
    impl ProviderAdapter for SettlesDuringInitiate {
        fn provider(&self) -> ProviderId {
            ProviderId::Chapa
        }

        async fn initiate(&self, ctx: &IntentContext) -> Result<CheckoutHandle, ProviderError> {
            self.store
                .mark_intent_status(
                    &ctx.intent_id.to_string(),
                    IntentStatus::Succeeded,
                    json!({ "status": "success" }),
                    Some("CH-1".to_string()),
                )
                .await
                .unwrap();
            Ok(CheckoutHandle {
                redirect_url: Some("https://checkout.chapa.co/late".to_string()),
                client_secret: None,
                provider_payload: json!({}),
            })
        }
    }

    fn caller() -> AuthenticatedUser {
        caller_named("user-1")
    }

    fn caller_named(id: &str) -> AuthenticatedUser {
        AuthenticatedUser::new(
            UserId::new(id).unwrap(),
            Some(format!("{}@example.com", id)),
            None,
        )
    }

    fn command(provider: &str) -> CreateIntentCommand {
        CreateIntentCommand {
            caller: Some(caller()),
            amount_cents: 5000,
            currency: "etb".to_string(),
            provider_id: provider.to_string(),
            method_id: None,
            address_id: AddressId::new(),
            delivery_window_id: DeliveryWindowId::new(),
            purpose: None,
            idempotency_key: None,
            selected_recipes: vec!["r1".to_string(), "r2".to_string()],
            quantities: vec![],
        }
    }

    fn handler_with(
        adapter: Arc<MockAdapter>,
    ) -> (CreateIntentHandler, Arc<InMemoryIntentStore>) {
        let store = Arc::new(InMemoryIntentStore::new());
        let handler = CreateIntentHandler::new(
            store.clone(),
            ProviderRegistry::new().with(adapter),
            "https://return.yenefresh.com/pay/return",
        );
        (handler, store)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Validation
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_caller_is_unauthorized_and_writes_nothing() {
        let (handler, store) = handler_with(Arc::new(MockAdapter::new(ProviderId::Chapa)));
        let mut cmd = command("chapa");
        cmd.caller = None;

        assert_eq!(handler.handle(cmd).await, Err(IntentError::Unauthorized));
        assert_eq!(store.intent_count(), 0);
    }

    #[tokio::test]
    async fn non_positive_amount_is_bad_request() {
        let (handler, _) = handler_with(Arc::new(MockAdapter::new(ProviderId::Chapa)));
        let mut cmd = command("chapa");
        cmd.amount_cents = 0;

        let err = handler.handle(cmd).await.unwrap_err();
        assert!(matches!(err, IntentError::BadRequest { ref field, .. } if field == "amount_cents"));
    }

    #[tokio::test]
    async fn mismatched_quantities_are_bad_request() {
        let (handler, _) = handler_with(Arc::new(MockAdapter::new(ProviderId::Chapa)));
        let mut cmd = command("chapa");
        cmd.quantities = vec![1];

        let err = handler.handle(cmd).await.unwrap_err();
        assert!(matches!(err, IntentError::BadRequest { ref field, .. } if field == "quantities"));
    }

    #[tokio::test]
    async fn unknown_provider_leaves_no_order() {
        let (handler, store) = handler_with(Arc::new(MockAdapter::new(ProviderId::Chapa)));

        let unparseable = handler.handle(command("stripe")).await.unwrap_err();
        let unregistered = handler.handle(command("telebirr")).await.unwrap_err();

        assert!(matches!(unparseable, IntentError::UnknownProvider(_)));
        assert!(matches!(unregistered, IntentError::UnknownProvider(_)));
        assert_eq!(store.order_count(), 0);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Creation
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn fresh_intent_returns_and_records_handle() {
        let adapter = Arc::new(MockAdapter::new(ProviderId::Chapa));
        let (handler, store) = handler_with(adapter.clone());

        let result = handler.handle(command("chapa")).await.unwrap();

        assert!(!result.replayed);
        assert_eq!(result.status, IntentStatus::Created);
        assert_eq!(result.client_secret.as_deref(), Some("secret-1"));

        let stored = store.intent(&result.intent_id.to_string()).unwrap();
        assert_eq!(stored.redirect_url, result.redirect_url);
        assert_eq!(stored.amount.currency(), "ETB");

        let ctx = adapter.calls.lock().unwrap()[0].clone();
        assert_eq!(ctx.customer_email.as_deref(), Some("user-1@example.com"));
        assert_eq!(ctx.return_url, "https://return.yenefresh.com/pay/return");
        assert!(ctx.idempotency_key.as_str().starts_with("yf_"));
    }

    #[tokio::test]
    async fn replayed_key_returns_stored_handle_without_provider_call() {
        let adapter = Arc::new(MockAdapter::new(ProviderId::Chapa));
        let (handler, store) = handler_with(adapter.clone());
        let mut cmd = command("chapa");
        cmd.idempotency_key = Some("order-42".to_string());

        let first = handler.handle(cmd.clone()).await.unwrap();
        let second = handler.handle(cmd).await.unwrap();

        assert!(second.replayed);
        assert_eq!(second.intent_id, first.intent_id);
        assert_eq!(second.order_id, first.order_id);
        assert_eq!(second.redirect_url, first.redirect_url);
        assert_eq!(adapter.call_count(), 1);
        assert_eq!(store.order_count(), 1);
    }

    #[tokio::test]
    async fn provider_failure_keeps_written_intent() {
        let (handler, store) = handler_with(Arc::new(MockAdapter::failing(ProviderId::Chapa)));

        let err = handler.handle(command("chapa")).await.unwrap_err();

        assert!(matches!(err, IntentError::ProviderInit(_)));
        assert!(err.is_retryable());
        assert_eq!(store.intent_count(), 1);
    }

    #[tokio::test]
    async fn resubmit_after_provider_failure_retries_checkout() {
        let adapter = Arc::new(MockAdapter::failing_times(ProviderId::Chapa, 1));
        let (handler, store) = handler_with(adapter.clone());
        let mut cmd = command("chapa");
        cmd.idempotency_key = Some("order-7".to_string());

        let first = handler.handle(cmd.clone()).await.unwrap_err();
        assert!(first.is_retryable());
        assert!(store.intent("order-7").unwrap().needs_checkout_retry());

        let second = handler.handle(cmd.clone()).await.unwrap();

        assert!(second.replayed);
        assert!(second.redirect_url.is_some());
        assert_eq!(adapter.call_count(), 2);
        let calls = adapter.calls.lock().unwrap().clone();
        assert_eq!(calls[0].intent_id, calls[1].intent_id);
        assert_eq!(calls[1].idempotency_key.as_str(), "order-7");

        let stored = store.intent("order-7").unwrap();
        assert_eq!(stored.redirect_url, second.redirect_url);
        assert!(stored.initiation_error.is_none());
        assert_eq!(store.order_count(), 1);

        let third = handler.handle(cmd).await.unwrap();
        assert_eq!(third.redirect_url, second.redirect_url);
        assert_eq!(adapter.call_count(), 2);
    }

    #[tokio::test]
    async fn key_held_by_another_user_is_refused() {
        let adapter = Arc::new(MockAdapter::new(ProviderId::Chapa));
        let (handler, store) = handler_with(adapter.clone());
        let mut owner = command("chapa");
        owner.idempotency_key = Some("k-1".to_string());
        handler.handle(owner.clone()).await.unwrap();

        let mut other = owner;
        other.caller = Some(caller_named("user-2"));
        let err = handler.handle(other).await.unwrap_err();

        assert_eq!(err, IntentError::KeyConflict);
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
        assert_eq!(adapter.call_count(), 1);
        assert_eq!(store.intent("k-1").unwrap().user_id.as_str(), "user-1");
    }

    #[tokio::test]
    async fn callback_during_initiation_keeps_reconciled_status() {
        let store = Arc::new(InMemoryIntentStore::new());
        let handler = CreateIntentHandler::new(
            store.clone(),
            ProviderRegistry::new().with(Arc::new(SettlesDuringInitiate {
                store: store.clone(),
            })),
            "https://return.yenefresh.com/pay/return",
        );

        let result = handler.handle(command("chapa")).await.unwrap();

        assert_eq!(result.status, IntentStatus::Succeeded);
        let stored = store.intent(&result.intent_id.to_string()).unwrap();
        assert_eq!(stored.status, IntentStatus::Succeeded);
        assert_eq!(stored.provider_payload, Some(json!({ "status": "success" })));
        assert_eq!(stored.provider_txn_id.as_deref(), Some("CH-1"));
        assert!(stored.redirect_url.is_none());
    }

    #[tokio::test]
    async fn store_rejection_surfaces_message() {
        let (handler, store) = handler_with(Arc::new(MockAdapter::new(ProviderId::Chapa)));
        store.fail_next_create(StoreError::Constraint("address does not exist".into()));

        let err = handler.handle(command("chapa")).await.unwrap_err();

        assert!(matches!(err, IntentError::Store(ref m) if m.contains("address does not exist")));
    }

    #[tokio::test]
    async fn failed_attach_still_returns_handle() {
        let (handler, store) = handler_with(Arc::new(MockAdapter::new(ProviderId::Chapa)));
        store.fail_attach(StoreError::unavailable("connection lost"));

        let result = handler.handle(command("chapa")).await.unwrap();

        assert!(result.redirect_url.is_some());
        let stored = store.intent(&result.intent_id.to_string()).unwrap();
        assert!(stored.redirect_url.is_none());
    }

    #[tokio::test]
    async fn cash_on_delivery_is_pending() {
        let (handler, store) = handler_with(Arc::new(MockAdapter::new(ProviderId::Cod)));

        let result = handler.handle(command("cod")).await.unwrap();

        assert_eq!(result.status, IntentStatus::Pending);
        assert_eq!(
            store.intent(&result.intent_id.to_string()).unwrap().status,
            IntentStatus::Pending
        );
    }
}
