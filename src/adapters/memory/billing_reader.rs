//! In-memory BillingReader for tests and local development.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::RwLock;

use crate::domain::billing::{PaymentMethod, ProviderCatalogEntry, Subscription, SweepStep};
use crate::domain::foundation::PaymentMethodId;
use crate::ports::{BillingReader, StoreError};

#[derive(Default)]
struct Tables {
    subscriptions: Vec<Subscription>,
    payment_methods: Vec<PaymentMethod>,
    providers: Vec<ProviderCatalogEntry>,
    failure: Option<(SweepStep, String)>,
}

#[derive(Default)]
pub struct InMemoryBillingReader {
    tables: RwLock<Tables>,
}

impl InMemoryBillingReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_subscription(&self, subscription: Subscription) {
        if let Ok(mut t) = self.tables.write() {
            t.subscriptions.push(subscription);
        }
    }

    pub fn add_payment_method(&self, method: PaymentMethod) {
        if let Ok(mut t) = self.tables.write() {
            t.payment_methods.push(method);
        }
    }

    pub fn add_provider(&self, entry: ProviderCatalogEntry) {
        if let Ok(mut t) = self.tables.write() {
            t.providers.push(entry);
        }
    }

    /// Makes the read for `step` fail with `message`.
    pub fn fail_at(&self, step: SweepStep, message: impl Into<String>) {
        if let Ok(mut t) = self.tables.write() {
            t.failure = Some((step, message.into()));
        }
    }

    fn tables(&self, step: SweepStep) -> Result<std::sync::RwLockReadGuard<'_, Tables>, StoreError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StoreError::unavailable("in-memory billing lock poisoned"))?;
        if let Some((failing, message)) = &tables.failure {
            if *failing == step {
                return Err(StoreError::unavailable(message.clone()));
            }
        }
        Ok(tables)
    }
}

#[async_trait]
impl BillingReader for InMemoryBillingReader {
    async fn due_subscriptions(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: u32,
    ) -> Result<Vec<Subscription>, StoreError> {
        let tables = self.tables(SweepStep::FetchSubs)?;
        let mut due: Vec<Subscription> = tables
            .subscriptions
            .iter()
            .filter(|s| from <= s.next_invoice_date && s.next_invoice_date <= to)
            .cloned()
            .collect();
        due.sort_by_key(|s| s.next_invoice_date);
        due.truncate(limit as usize);
        Ok(due)
    }

    async fn payment_methods(
        &self,
        ids: &[PaymentMethodId],
    ) -> Result<Vec<PaymentMethod>, StoreError> {
        let tables = self.tables(SweepStep::FetchPaymentMethods)?;
        Ok(tables
            .payment_methods
            .iter()
            .filter(|m| ids.contains(&m.id))
            .cloned()
            .collect())
    }

    async fn providers(&self, ids: &[String]) -> Result<Vec<ProviderCatalogEntry>, StoreError> {
        let tables = self.tables(SweepStep::FetchProviders)?;
        Ok(tables
            .providers
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }
}
