//! PostgreSQL implementation of BillingReader.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::{
    PaymentMethod, PaymentMethodStatus, ProviderCatalogEntry, ShippingWindow, Subscription,
};
use crate::domain::foundation::{PaymentMethodId, SubscriptionId, UserId};
use crate::domain::payment::ProviderKind;
use crate::ports::{BillingReader, StoreError};

pub struct PostgresBillingReader {
    pool: PgPool,
}

impl PostgresBillingReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    user_id: String,
    next_invoice_date: NaiveDate,
    default_method_id: Option<Uuid>,
    shipping_window: Option<JsonValue>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = StoreError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        // Shipping metadata is free-form; an unreadable blob bills with unset references.
        let shipping_window = row.shipping_window.and_then(|value| {
            serde_json::from_value::<ShippingWindow>(value)
                .map_err(|e| {
                    tracing::warn!(subscription_id = %row.id, error = %e, "unreadable shipping_window");
                })
                .ok()
        });

        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            user_id: UserId::new(row.user_id)
                .map_err(|e| StoreError::corrupt(format!("subscription user_id: {}", e)))?,
            next_invoice_date: row.next_invoice_date,
            default_method_id: row.default_method_id.map(PaymentMethodId::from_uuid),
            shipping_window,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentMethodRow {
    id: Uuid,
    user_id: String,
    provider_id: String,
    status: String,
}

impl TryFrom<PaymentMethodRow> for PaymentMethod {
    type Error = StoreError;

    fn try_from(row: PaymentMethodRow) -> Result<Self, Self::Error> {
        let status = match row.status.as_str() {
            "active" => PaymentMethodStatus::Active,
            _ => PaymentMethodStatus::Inactive,
        };
        Ok(PaymentMethod {
            id: PaymentMethodId::from_uuid(row.id),
            user_id: UserId::new(row.user_id)
                .map_err(|e| StoreError::corrupt(format!("payment method user_id: {}", e)))?,
            provider_id: row.provider_id,
            status,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProviderRow {
    id: String,
    kind: Option<String>,
}

fn map_sqlx_error(e: sqlx::Error) -> StoreError {
    StoreError::unavailable(e.to_string())
}

#[async_trait]
impl BillingReader for PostgresBillingReader {
    async fn due_subscriptions(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: u32,
    ) -> Result<Vec<Subscription>, StoreError> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, next_invoice_date, default_method_id, shipping_window
            FROM subscriptions
            WHERE status = 'active'
              AND next_invoice_date BETWEEN $1 AND $2
            ORDER BY next_invoice_date, id
            LIMIT $3
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(Subscription::try_from).collect()
    }

    async fn payment_methods(
        &self,
        ids: &[PaymentMethodId],
    ) -> Result<Vec<PaymentMethod>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows: Vec<PaymentMethodRow> = sqlx::query_as(
            "SELECT id, user_id, provider_id, status FROM payment_methods WHERE id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(PaymentMethod::try_from).collect()
    }

    async fn providers(&self, ids: &[String]) -> Result<Vec<ProviderCatalogEntry>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<ProviderRow> =
            sqlx::query_as("SELECT id, kind FROM payment_providers WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| ProviderCatalogEntry {
                kind: row.kind.as_deref().and_then(ProviderKind::parse),
                id: row.id,
            })
            .collect())
    }
}
