//! Request and response bodies for `POST /api/payments/intents`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::application::handlers::payment::{CreateIntentCommand, CreateIntentResult};
use crate::domain::foundation::{
    AuthenticatedUser, DeliveryWindowId, OrderId, PaymentIntentId, PaymentMethodId,
};
use crate::domain::payment::{IntentError, IntentStatus};

/// Body of a create-intent request. Identifiers arrive as strings and are
/// parsed here so a malformed one is a 400 naming its field.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIntentRequest {
    pub amount_cents: i64,
    pub currency: String,
    pub provider_id: String,
    #[serde(default)]
    pub method_id: Option<String>,
    pub address_id: String,
    pub delivery_window_id: String,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub idempotency_key: Option<String>,
    #[serde(default)]
    pub selected_recipes: Vec<String>,
    #[serde(default)]
    pub quantities: Vec<i64>,
}

impl CreateIntentRequest {
    pub fn into_command(
        self,
        caller: Option<AuthenticatedUser>,
    ) -> Result<CreateIntentCommand, IntentError> {
        let method_id = self
            .method_id
            .filter(|m| !m.trim().is_empty())
            .map(|m| parse_id::<PaymentMethodId>("method_id", &m))
            .transpose()?;

        Ok(CreateIntentCommand {
            caller,
            amount_cents: self.amount_cents,
            currency: self.currency,
            provider_id: self.provider_id,
            method_id,
            address_id: parse_id("address_id", &self.address_id)?,
            delivery_window_id: parse_id::<DeliveryWindowId>(
                "delivery_window_id",
                &self.delivery_window_id,
            )?,
            purpose: self.purpose,
            idempotency_key: self.idempotency_key,
            selected_recipes: self.selected_recipes,
            quantities: self.quantities,
        })
    }
}

fn parse_id<T: FromStr>(field: &str, raw: &str) -> Result<T, IntentError> {
    raw.trim()
        .parse()
        .map_err(|_| IntentError::bad_request(field, "must be a UUID"))
}

/// Success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIntentResponse {
    pub order_id: OrderId,
    pub intent_id: PaymentIntentId,
    pub status: IntentStatus,
    pub client_secret: Option<String>,
    pub redirect_url: Option<String>,
    pub replayed: bool,
}

impl From<CreateIntentResult> for CreateIntentResponse {
    fn from(result: CreateIntentResult) -> Self {
        Self {
            order_id: result.order_id,
            intent_id: result.intent_id,
            status: result.status,
            client_secret: result.client_secret,
            redirect_url: result.redirect_url,
            replayed: result.replayed,
        }
    }
}
