//! Idempotency keys for intent creation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::foundation::{SubscriptionId, ValidationError};

/// Longest key the store accepts.
const MAX_KEY_LEN: usize = 255;

/// A token that makes repeated intent-creation requests produce one effect.
///
/// Interactive callers may supply their own key; otherwise one is generated.
/// The billing sweep derives its key from the subscription and due date so
/// overlapping or repeated sweeps land on the same intent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Validates a caller-supplied key.
    pub fn parse(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("idempotency_key"));
        }
        if trimmed.len() > MAX_KEY_LEN {
            return Err(ValidationError::out_of_range(
                "idempotency_key",
                1,
                MAX_KEY_LEN as i64,
                trimmed.len() as i64,
            ));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ValidationError::invalid_format(
                "idempotency_key",
                "control characters are not allowed",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// A fresh random key for callers that did not send one.
    pub fn generate() -> Self {
        Self(format!("yf_{}", Uuid::new_v4()))
    }

    /// Deterministic key for billing a subscription's invoice date.
    pub fn for_billing(subscription_id: &SubscriptionId, next_invoice_date: NaiveDate) -> Self {
        Self(format!(
            "cron_{}_{}",
            subscription_id,
            next_invoice_date.format("%Y-%m-%d")
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
