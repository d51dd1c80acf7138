//! RunBillingSweepHandler - finds due subscriptions and bills them.
//!
//! Card subscriptions are charged through the same `CreateIntentHandler`
//! interactive callers use, with an idempotency key derived from the
//! subscription and its due date. Repeated sweeps over the same window
//! therefore create each charge at most once. Everything else gets a
//! reminder event, since those rails need the user present.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::application::handlers::payment::{CreateIntentCommand, CreateIntentHandler};
use crate::domain::billing::{
    kind_label, BillingReminderDue, BillingRoute, BillingSummary, BillingSweepError, BillingWindow,
    PaymentMethod, RunMode, Subscription, SweepStep,
};
use crate::domain::foundation::{
    AuthenticatedUser, PaymentMethodId, SerializableDomainEvent, Timestamp,
};
use crate::domain::payment::{IdempotencyKey, ProviderKind};
use crate::ports::{BillingReader, EventPublisher};

/// Command to run one sweep as of `now`.
#[derive(Debug, Clone, Copy)]
pub struct RunBillingSweepCommand {
    pub now: Timestamp,
}

/// Sweep behavior, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepSettings {
    pub run_mode: RunMode,
    pub lookahead_days: u32,
    /// Reported in the summary only; windows are computed in UTC dates.
    pub timezone: String,
    pub page_limit: u32,
    pub amount_cents: i64,
    pub currency: String,
    pub purpose: String,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            run_mode: RunMode::Dry,
            lookahead_days: 3,
            timezone: "Africa/Addis_Ababa".to_string(),
            page_limit: 500,
            amount_cents: 50_000,
            currency: "ETB".to_string(),
            purpose: "weekly_box".to_string(),
        }
    }
}

pub struct RunBillingSweepHandler {
    reader: Arc<dyn BillingReader>,
    orchestrator: Arc<CreateIntentHandler>,
    events: Arc<dyn EventPublisher>,
    settings: SweepSettings,
}

/// One due subscription with whatever could be resolved about how it pays.
struct DueItem<'a> {
    subscription: &'a Subscription,
    method: Option<&'a PaymentMethod>,
    kind: Option<ProviderKind>,
}

impl RunBillingSweepHandler {
    pub fn new(
        reader: Arc<dyn BillingReader>,
        orchestrator: Arc<CreateIntentHandler>,
        events: Arc<dyn EventPublisher>,
        settings: SweepSettings,
    ) -> Self {
        Self {
            reader,
            orchestrator,
            events,
            settings,
        }
    }

    pub fn run_mode(&self) -> RunMode {
        self.settings.run_mode
    }

    pub async fn handle(
        &self,
        cmd: RunBillingSweepCommand,
    ) -> Result<BillingSummary, BillingSweepError> {
        let settings = &self.settings;
        let window = BillingWindow::starting_at(cmd.now, settings.lookahead_days);
        let mut summary = BillingSummary::new(
            settings.run_mode,
            settings.timezone.clone(),
            settings.lookahead_days,
            window,
            settings.page_limit,
        );
        let sweep_id = Uuid::new_v4().to_string();

        // 1. Due subscriptions
        let subscriptions = self
            .reader
            .due_subscriptions(window.from, window.to, settings.page_limit)
            .await
            .map_err(|e| fetch_failed(SweepStep::FetchSubs, e))?;
        summary.fetched = subscriptions.len();

        if subscriptions.is_empty() {
            summary.note("No active subs due in window.");
            return Ok(summary);
        }
        if summary.is_truncated() {
            summary.note(format!(
                "Fetched {} subs, the page limit; later subs are left for the next run.",
                summary.fetched
            ));
        }

        // 2. Default payment methods
        let method_ids = unique(subscriptions.iter().filter_map(|s| s.default_method_id));
        let methods: HashMap<PaymentMethodId, PaymentMethod> = if method_ids.is_empty() {
            HashMap::new()
        } else {
            self.reader
                .payment_methods(&method_ids)
                .await
                .map_err(|e| fetch_failed(SweepStep::FetchPaymentMethods, e))?
                .into_iter()
                .map(|m| (m.id, m))
                .collect()
        };

        // 3. Provider kinds for active methods
        let provider_ids = unique(
            methods
                .values()
                .filter(|m| m.is_active())
                .map(|m| m.provider_id.clone()),
        );
        let kinds: HashMap<String, Option<ProviderKind>> = if provider_ids.is_empty() {
            HashMap::new()
        } else {
            self.reader
                .providers(&provider_ids)
                .await
                .map_err(|e| fetch_failed(SweepStep::FetchProviders, e))?
                .into_iter()
                .map(|p| (p.id, p.kind))
                .collect()
        };

        // 4. Partition and act
        for subscription in &subscriptions {
            let method = subscription
                .default_method_id
                .and_then(|id| methods.get(&id))
                .filter(|m| m.is_active());
            let kind = method.and_then(|m| kinds.get(&m.provider_id).copied().flatten());
            let item = DueItem {
                subscription,
                method,
                kind,
            };

            let route = BillingRoute::for_kind(item.kind);
            summary.count(route);

            match settings.run_mode {
                RunMode::Dry => summary.note(format!(
                    "DRY: would bill sub {} (user {}) via {}",
                    subscription.id,
                    subscription.user_id,
                    kind_label(kind)
                )),
                RunMode::Live => match (route, item.method) {
                    (BillingRoute::Card, Some(method)) => {
                        self.charge(subscription, method, &mut summary).await
                    }
                    _ => self.remind(&item, &sweep_id, &mut summary).await,
                },
            }
        }

        tracing::info!(
            mode = %summary.mode,
            fetched = summary.fetched,
            card = summary.counts.card,
            local_or_cod = summary.counts.local_or_cod,
            acted_on = summary.acted_on,
            "billing sweep finished"
        );

        Ok(summary)
    }

    async fn charge(
        &self,
        subscription: &Subscription,
        method: &PaymentMethod,
        summary: &mut BillingSummary,
    ) {
        let settings = &self.settings;
        let key = IdempotencyKey::for_billing(&subscription.id, subscription.next_invoice_date);

        let cmd = CreateIntentCommand {
            caller: Some(AuthenticatedUser::on_behalf_of(subscription.user_id.clone())),
            amount_cents: settings.amount_cents,
            currency: settings.currency.clone(),
            provider_id: method.provider_id.clone(),
            method_id: Some(method.id),
            address_id: subscription.address_id(),
            delivery_window_id: subscription.delivery_window_id(),
            purpose: Some(settings.purpose.clone()),
            idempotency_key: Some(key.to_string()),
            selected_recipes: Vec::new(),
            quantities: Vec::new(),
        };

        match self.orchestrator.handle(cmd).await {
            Ok(result) if result.replayed => summary.note(format!(
                "LIVE: intent already exists for sub {} ({})",
                subscription.id, result.intent_id
            )),
            Ok(result) => {
                summary.acted_on += 1;
                summary.note(format!(
                    "LIVE: created intent {} for sub {}",
                    result.intent_id, subscription.id
                ));
            }
            Err(e) => {
                tracing::warn!(
                    subscription_id = %subscription.id,
                    idempotency_key = %key,
                    error = %e,
                    "billing charge failed"
                );
                summary.note(format!(
                    "LIVE: failed to create intent for sub {}: {}",
                    subscription.id, e
                ));
            }
        }
    }

    async fn remind(&self, item: &DueItem<'_>, sweep_id: &str, summary: &mut BillingSummary) {
        let subscription = item.subscription;
        let label = kind_label(item.kind);
        let event = BillingReminderDue::for_invoice(
            subscription.id,
            subscription.user_id.clone(),
            subscription.next_invoice_date,
            label,
            item.method.map(|m| m.provider_id.clone()),
        );

        let published = match event.to_envelope() {
            Ok(envelope) => {
                let envelope = envelope
                    .with_correlation_id(sweep_id)
                    .with_user_id(subscription.user_id.as_str());
                self.events.publish(envelope).await
            }
            Err(e) => Err(e),
        };

        match published {
            Ok(()) => {
                summary.acted_on += 1;
                summary.note(format!(
                    "LIVE: enqueued reminder for sub {} via {}",
                    subscription.id, label
                ));
            }
            Err(e) => {
                tracing::warn!(subscription_id = %subscription.id, error = %e, "reminder publish failed");
                summary.note(format!("LIVE: error for sub {}: {}", subscription.id, e));
            }
        }
    }
}

fn fetch_failed(step: SweepStep, err: impl std::fmt::Display) -> BillingSweepError {
    tracing::error!(step = %step, error = %err, "billing sweep aborted");
    BillingSweepError::new(step, err.to_string())
}

/// Distinct values in first-seen order.
fn unique<T: Clone + Eq + std::hash::Hash>(values: impl Iterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    values.filter(|v| seen.insert(v.clone())).collect()
}
