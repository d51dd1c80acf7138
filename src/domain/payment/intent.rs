//! Order and PaymentIntent entities.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::foundation::{
    AddressId, DeliveryWindowId, OrderId, PaymentIntentId, StateMachine, Timestamp, UserId,
    ValidationError,
};

use super::{IdempotencyKey, IntentStatus, Money, ProviderId};

/// Purpose recorded on orders when the caller gives none.
pub const DEFAULT_PURPOSE: &str = "weekly_box";

/// One selected recipe and how many of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub recipe_id: String,
    pub quantity: u32,
}

impl LineItem {
    /// Pairs recipe ids with quantities.
    ///
    /// `quantities` may be empty (every recipe counts once) or must match
    /// `recipes` in length. Quantities must be at least one.
    pub fn zip(recipes: Vec<String>, quantities: Vec<i64>) -> Result<Vec<LineItem>, ValidationError> {
        if !quantities.is_empty() && quantities.len() != recipes.len() {
            return Err(ValidationError::invalid_format(
                "quantities",
                format!(
                    "expected {} quantities to match selected_recipes, got {}",
                    recipes.len(),
                    quantities.len()
                ),
            ));
        }

        recipes
            .into_iter()
            .enumerate()
            .map(|(i, recipe_id)| {
                if recipe_id.trim().is_empty() {
                    return Err(ValidationError::empty_field("selected_recipes"));
                }
                let quantity = quantities.get(i).copied().unwrap_or(1);
                let quantity = u32::try_from(quantity)
                    .ok()
                    .filter(|q| *q >= 1)
                    .ok_or_else(|| {
                        ValidationError::out_of_range("quantities", 1, u32::MAX as i64, quantity)
                    })?;
                Ok(LineItem { recipe_id, quantity })
            })
            .collect()
    }
}

/// One purchase occasion. Written together with its intent, never updated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total: Money,
    pub line_items: Vec<LineItem>,
    pub address_id: AddressId,
    pub delivery_window_id: DeliveryWindowId,
    pub purpose: String,
    pub created_at: Timestamp,
}

/// What a provider adapter hands back after initiating checkout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CheckoutHandle {
    pub redirect_url: Option<String>,
    pub client_secret: Option<String>,
    pub provider_payload: JsonValue,
}

/// Outcome of applying a reconciled status to an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    /// The intent moved (or refreshed its pending payload).
    Applied { from: IntentStatus, to: IntentStatus },
    /// The intent is final; nothing was written.
    Unchanged { current: IntentStatus },
}

/// The unit of reconciliation: one attempt to collect payment for an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: PaymentIntentId,
    pub order_id: OrderId,
    pub user_id: UserId,
    pub provider: ProviderId,
    pub amount: Money,
    pub idempotency_key: IdempotencyKey,
    pub status: IntentStatus,
    pub client_secret: Option<String>,
    pub redirect_url: Option<String>,
    pub provider_payload: Option<JsonValue>,
    pub provider_txn_id: Option<String>,
    /// Why the last checkout initiation failed. Cleared once a handle lands.
    #[serde(default)]
    pub initiation_error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PaymentIntent {
    /// A freshly created intent for `order`, status `created`.
    pub fn for_order(
        order: &Order,
        provider: ProviderId,
        idempotency_key: IdempotencyKey,
    ) -> Self {
        Self {
            id: PaymentIntentId::new(),
            order_id: order.id,
            user_id: order.user_id.clone(),
            provider,
            amount: order.total.clone(),
            idempotency_key,
            status: IntentStatus::Created,
            client_secret: None,
            redirect_url: None,
            provider_payload: None,
            provider_txn_id: None,
            initiation_error: None,
            created_at: order.created_at,
            updated_at: order.created_at,
        }
    }

    /// Status an intent takes once its checkout handle is attached.
    pub fn status_after_checkout(provider: ProviderId) -> IntentStatus {
        if provider.is_cash_on_delivery() {
            IntentStatus::Pending
        } else {
            IntentStatus::Created
        }
    }

    /// True when checkout initiation failed and nothing has happened since,
    /// so a resubmit with the same key should ask the provider again.
    pub fn needs_checkout_retry(&self) -> bool {
        self.status == IntentStatus::Created && self.initiation_error.is_some()
    }

    /// Notes a failed checkout initiation. Only a `created` intent records it.
    pub fn record_initiation_failure(&mut self, reason: impl Into<String>) -> bool {
        if self.status != IntentStatus::Created {
            return false;
        }
        self.initiation_error = Some(reason.into());
        self.updated_at = Timestamp::now();
        true
    }

    /// Records the adapter's checkout handle.
    ///
    /// Only an intent still `created` takes it. Once a callback has moved the
    /// intent, the provider's status and payload stand and this returns false.
    pub fn attach_checkout(&mut self, handle: &CheckoutHandle, status: IntentStatus) -> bool {
        if self.status != IntentStatus::Created {
            return false;
        }
        self.redirect_url = handle.redirect_url.clone();
        self.client_secret = handle.client_secret.clone();
        self.provider_payload = Some(handle.provider_payload.clone());
        self.initiation_error = None;
        self.status = status;
        self.updated_at = Timestamp::now();
        true
    }

    /// Applies a reconciled status, refusing to leave a final status.
    ///
    /// The raw callback payload and the transaction id are only recorded when
    /// the transition is accepted.
    pub fn reconcile(
        &mut self,
        target: IntentStatus,
        provider_response: JsonValue,
        provider_txn_id: Option<String>,
    ) -> StatusUpdate {
        let from = self.status;
        if !from.can_transition_to(&target) {
            return StatusUpdate::Unchanged { current: from };
        }

        self.status = target;
        self.provider_payload = Some(provider_response);
        if provider_txn_id.is_some() {
            self.provider_txn_id = provider_txn_id;
        }
        self.updated_at = Timestamp::now();

        StatusUpdate::Applied { from, to: target }
    }
}
