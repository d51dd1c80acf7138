//! BillingReader port - the billing sweep's read side.
//!
//! Three independent reads, in the order the sweep performs them. Each is
//! reported as its own step when it fails.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::billing::{PaymentMethod, ProviderCatalogEntry, Subscription};
use crate::domain::foundation::PaymentMethodId;

use super::StoreError;

#[async_trait]
pub trait BillingReader: Send + Sync {
    /// Active subscriptions with `from <= next_invoice_date <= to`, ordered by
    /// due date and bounded by `limit`.
    async fn due_subscriptions(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: u32,
    ) -> Result<Vec<Subscription>, StoreError>;

    /// Payment methods by id. Unknown ids are simply absent from the result.
    async fn payment_methods(
        &self,
        ids: &[PaymentMethodId],
    ) -> Result<Vec<PaymentMethod>, StoreError>;

    /// Catalog entries by provider id.
    async fn providers(&self, ids: &[String]) -> Result<Vec<ProviderCatalogEntry>, StoreError>;
}
