//! In-memory IntentStore for tests and local development.
//!
//! A single `RwLock` around all state gives the same atomicity the database
//! gets from its transaction and conditional update.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use crate::domain::foundation::{OrderId, PaymentIntentId};
use crate::domain::payment::{CheckoutHandle, IntentStatus, Order, PaymentIntent, StatusUpdate};
use crate::ports::{CreateOutcome, IntentStore, StoreError};

#[derive(Default)]
struct State {
    orders: HashMap<OrderId, Order>,
    intents: HashMap<PaymentIntentId, PaymentIntent>,
    by_key: HashMap<String, PaymentIntentId>,
}

impl State {
    fn resolve(&self, reference: &str) -> Option<PaymentIntentId> {
        reference
            .parse::<PaymentIntentId>()
            .ok()
            .filter(|id| self.intents.contains_key(id))
            .or_else(|| self.by_key.get(reference).copied())
    }
}

#[derive(Default)]
pub struct InMemoryIntentStore {
    state: RwLock<State>,
    create_failure: Mutex<Option<StoreError>>,
    attach_failure: Mutex<Option<StoreError>>,
    ping_failure: Mutex<Option<StoreError>>,
}

impl InMemoryIntentStore {
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Inserts an intent directly, bypassing the order write.
    pub fn seed(&self, intent: PaymentIntent) {
        if let Ok(mut state) = self.state.write() {
            state
                .by_key
                .insert(intent.idempotency_key.as_str().to_string(), intent.id);
            state.intents.insert(intent.id, intent);
        }
    }

    /// Makes the next create call fail with `err`.
    pub fn fail_next_create(&self, err: StoreError) {
        if let Ok(mut slot) = self.create_failure.lock() {
            *slot = Some(err);
        }
    }

    /// Makes every attach call fail with `err`.
    pub fn fail_attach(&self, err: StoreError) {
        if let Ok(mut slot) = self.attach_failure.lock() {
            *slot = Some(err);
        }
    }

    /// Makes every ping fail with `err`.
    pub fn fail_ping(&self, err: StoreError) {
        if let Ok(mut slot) = self.ping_failure.lock() {
            *slot = Some(err);
        }
    }

    /// Looks an intent up by id or idempotency key.
    pub fn intent(&self, reference: &str) -> Option<PaymentIntent> {
        let state = self.state.read().ok()?;
        let id = state.resolve(reference)?;
        state.intents.get(&id).cloned()
    }

    pub fn intent_count(&self) -> usize {
        self.state.read().map(|s| s.intents.len()).unwrap_or(0)
    }

    pub fn order_count(&self) -> usize {
        self.state.read().map(|s| s.orders.len()).unwrap_or(0)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::unavailable("in-memory store lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::unavailable("in-memory store lock poisoned"))
    }
}

fn take(slot: &Mutex<Option<StoreError>>) -> Option<StoreError> {
    slot.lock().ok().and_then(|mut s| s.take())
}

fn peek(slot: &Mutex<Option<StoreError>>) -> Option<StoreError> {
    slot.lock().ok().and_then(|s| s.clone())
}

#[async_trait]
impl IntentStore for InMemoryIntentStore {
    async fn create_order_with_intent(
        &self,
        order: &Order,
        intent: &PaymentIntent,
    ) -> Result<CreateOutcome, StoreError> {
        if let Some(err) = take(&self.create_failure) {
            return Err(err);
        }

        let mut state = self.write()?;

        if let Some(existing) = state.by_key.get(intent.idempotency_key.as_str()) {
            let existing = state
                .intents
                .get(existing)
                .cloned()
                .ok_or_else(|| StoreError::corrupt("idempotency index points at nothing"))?;
            return Ok(CreateOutcome::Existing(existing));
        }

        state.orders.insert(order.id, order.clone());
        state
            .by_key
            .insert(intent.idempotency_key.as_str().to_string(), intent.id);
        state.intents.insert(intent.id, intent.clone());

        Ok(CreateOutcome::Created)
    }

    async fn attach_checkout(
        &self,
        intent_id: &PaymentIntentId,
        handle: &CheckoutHandle,
        status: IntentStatus,
    ) -> Result<IntentStatus, StoreError> {
        if let Some(err) = peek(&self.attach_failure) {
            return Err(err);
        }

        let mut state = self.write()?;
        let intent = state
            .intents
            .get_mut(intent_id)
            .ok_or_else(|| StoreError::NotFound(intent_id.to_string()))?;
        intent.attach_checkout(handle, status);
        Ok(intent.status)
    }

    async fn record_initiation_failure(
        &self,
        intent_id: &PaymentIntentId,
        reason: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if let Some(intent) = state.intents.get_mut(intent_id) {
            intent.record_initiation_failure(reason);
        }
        Ok(())
    }

    async fn mark_intent_status(
        &self,
        reference: &str,
        status: IntentStatus,
        provider_response: JsonValue,
        provider_txn_id: Option<String>,
    ) -> Result<StatusUpdate, StoreError> {
        let mut state = self.write()?;
        let id = state
            .resolve(reference)
            .ok_or_else(|| StoreError::NotFound(reference.to_string()))?;
        let intent = state
            .intents
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(reference.to_string()))?;

        Ok(intent.reconcile(status, provider_response, provider_txn_id))
    }

    async fn find_intent(&self, reference: &str) -> Result<Option<PaymentIntent>, StoreError> {
        let state = self.read()?;
        Ok(state
            .resolve(reference)
            .and_then(|id| state.intents.get(&id).cloned()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if let Some(err) = peek(&self.ping_failure) {
            return Err(err);
        }
        self.read().map(|_| ())
    }
}
