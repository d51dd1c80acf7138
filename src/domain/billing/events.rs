//! Events raised by the billing sweep.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EventId, SubscriptionId, Timestamp, UserId};
use crate::domain_event;

/// A non-card subscription is due and its owner must confirm payment.
///
/// Consumed by the notification service, which owns delivery (SMS, push).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingReminderDue {
    pub event_id: EventId,
    pub subscription_id: SubscriptionId,
    pub user_id: UserId,
    pub next_invoice_date: NaiveDate,
    /// Provider kind label (`local_wallet`, `cod`, `unknown`, ...).
    pub kind: String,
    /// Provider id of the default payment method, when resolved.
    pub provider_id: Option<String>,
    pub occurred_at: Timestamp,
}

impl BillingReminderDue {
    /// Reminder for one subscription's invoice. The event id is
    /// `reminder_{subscription}_{date}`, identical across sweeps of the
    /// same window.
    pub fn for_invoice(
        subscription_id: SubscriptionId,
        user_id: UserId,
        next_invoice_date: NaiveDate,
        kind: impl Into<String>,
        provider_id: Option<String>,
    ) -> Self {
        Self {
            event_id: EventId::deterministic(format!(
                "reminder_{}_{}",
                subscription_id,
                next_invoice_date.format("%Y-%m-%d")
            )),
            subscription_id,
            user_id,
            next_invoice_date,
            kind: kind.into(),
            provider_id,
            occurred_at: Timestamp::now(),
        }
    }
}

domain_event!(
    BillingReminderDue,
    event_type = "billing.reminder_due.v1",
    schema_version = 1,
    aggregate_id = subscription_id,
    aggregate_type = "Subscription",
    occurred_at = occurred_at,
    event_id = event_id
);
