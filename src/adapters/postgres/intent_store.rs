//! PostgreSQL implementation of IntentStore.
//!
//! Idempotency rides on the `payment_intents_idempotency_key_key` unique
//! constraint and finality on a conditional update, so concurrent requests
//! and duplicate webhooks are safe without application locks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::foundation::{OrderId, PaymentIntentId, Timestamp, UserId};
use crate::domain::payment::{
    CheckoutHandle, IdempotencyKey, IntentStatus, Money, Order, PaymentIntent, ProviderId,
    StatusUpdate,
};
use crate::ports::{CreateOutcome, IntentStore, StoreError};

const INTENT_COLUMNS: &str = r#"
    id, order_id, user_id, provider_id, amount_cents, currency, idempotency_key,
    status, client_secret, redirect_url, provider_payload, provider_txn_id,
    initiation_error, created_at, updated_at
"#;

pub struct PostgresIntentStore {
    pool: PgPool,
}

impl PostgresIntentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_order(
        tx: &mut Transaction<'_, Postgres>,
        order: &Order,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, total_cents, currency, address_id, delivery_window_id,
                purpose, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_str())
        .bind(order.total.amount_cents())
        .bind(order.total.currency())
        .bind(order.address_id.as_uuid())
        .bind(order.delivery_window_id.as_uuid())
        .bind(&order.purpose)
        .bind(order.created_at.as_datetime())
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        for (position, item) in order.line_items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, position, recipe_id, quantity)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(order.id.as_uuid())
            .bind(position as i32)
            .bind(&item.recipe_id)
            .bind(item.quantity as i32)
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        Ok(())
    }

    async fn current_status(&self, reference: &str) -> Result<Option<IntentStatus>, StoreError> {
        let status: Option<String> = sqlx::query_scalar(
            r#"
            SELECT status FROM payment_intents
            WHERE id::text = $1 OR idempotency_key = $1
            ORDER BY (id::text = $1) DESC
            LIMIT 1
            "#,
        )
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        status.map(|s| parse_status(&s)).transpose()
    }
}

/// Database row representation of a payment intent.
#[derive(Debug, sqlx::FromRow)]
struct IntentRow {
    id: Uuid,
    order_id: Uuid,
    user_id: String,
    provider_id: String,
    amount_cents: i64,
    currency: String,
    idempotency_key: String,
    status: String,
    client_secret: Option<String>,
    redirect_url: Option<String>,
    provider_payload: Option<JsonValue>,
    provider_txn_id: Option<String>,
    initiation_error: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<IntentRow> for PaymentIntent {
    type Error = StoreError;

    fn try_from(row: IntentRow) -> Result<Self, Self::Error> {
        Ok(PaymentIntent {
            id: PaymentIntentId::from_uuid(row.id),
            order_id: OrderId::from_uuid(row.order_id),
            user_id: UserId::new(row.user_id)
                .map_err(|e| StoreError::corrupt(format!("user_id: {}", e)))?,
            provider: row
                .provider_id
                .parse::<ProviderId>()
                .map_err(|e| StoreError::corrupt(format!("provider_id: {}", e)))?,
            amount: Money::new(row.amount_cents, row.currency.trim())
                .map_err(|e| StoreError::corrupt(format!("amount: {}", e)))?,
            idempotency_key: IdempotencyKey::parse(row.idempotency_key)
                .map_err(|e| StoreError::corrupt(format!("idempotency_key: {}", e)))?,
            status: parse_status(&row.status)?,
            client_secret: row.client_secret,
            redirect_url: row.redirect_url,
            provider_payload: row.provider_payload,
            provider_txn_id: row.provider_txn_id,
            initiation_error: row.initiation_error,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_status(s: &str) -> Result<IntentStatus, StoreError> {
    s.parse::<IntentStatus>()
        .map_err(|e| StoreError::corrupt(format!("status: {}", e)))
}

fn map_sqlx_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.constraint().is_some() => {
            StoreError::Constraint(db_err.message().to_string())
        }
        sqlx::Error::RowNotFound => StoreError::NotFound(e.to_string()),
        _ => StoreError::unavailable(e.to_string()),
    }
}

#[async_trait]
impl IntentStore for PostgresIntentStore {
    async fn create_order_with_intent(
        &self,
        order: &Order,
        intent: &PaymentIntent,
    ) -> Result<CreateOutcome, StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        Self::insert_order(&mut tx, order).await?;

        let inserted: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO payment_intents (
                id, order_id, user_id, provider_id, amount_cents, currency,
                idempotency_key, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (idempotency_key) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(intent.id.as_uuid())
        .bind(intent.order_id.as_uuid())
        .bind(intent.user_id.as_str())
        .bind(intent.provider.as_str())
        .bind(intent.amount.amount_cents())
        .bind(intent.amount.currency())
        .bind(intent.idempotency_key.as_str())
        .bind(intent.status.as_str())
        .bind(intent.created_at.as_datetime())
        .bind(intent.updated_at.as_datetime())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if inserted.is_some() {
            tx.commit().await.map_err(map_sqlx_error)?;
            return Ok(CreateOutcome::Created);
        }

        // Key already taken: drop the speculative order and report the stored intent.
        tx.rollback().await.map_err(map_sqlx_error)?;

        let existing = self
            .find_intent(intent.idempotency_key.as_str())
            .await?
            .ok_or_else(|| {
                StoreError::Constraint(format!(
                    "idempotency key {} conflicted but no intent was found",
                    intent.idempotency_key
                ))
            })?;

        tracing::info!(
            intent_id = %existing.id,
            idempotency_key = %intent.idempotency_key,
            "idempotent replay of intent creation"
        );

        Ok(CreateOutcome::Existing(existing))
    }

    async fn attach_checkout(
        &self,
        intent_id: &PaymentIntentId,
        handle: &CheckoutHandle,
        status: IntentStatus,
    ) -> Result<IntentStatus, StoreError> {
        let attached: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE payment_intents SET
                client_secret = $2,
                redirect_url = $3,
                provider_payload = $4,
                status = $5,
                initiation_error = NULL,
                updated_at = now()
            WHERE id = $1 AND status = 'created'
            RETURNING status
            "#,
        )
        .bind(intent_id.as_uuid())
        .bind(&handle.client_secret)
        .bind(&handle.redirect_url)
        .bind(&handle.provider_payload)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if let Some(attached) = attached {
            return parse_status(&attached);
        }

        // A callback got there first; its status and payload stand.
        self.current_status(&intent_id.to_string())
            .await?
            .ok_or_else(|| StoreError::NotFound(intent_id.to_string()))
    }

    async fn record_initiation_failure(
        &self,
        intent_id: &PaymentIntentId,
        reason: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE payment_intents SET
                initiation_error = $2,
                updated_at = now()
            WHERE id = $1 AND status = 'created'
            "#,
        )
        .bind(intent_id.as_uuid())
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn mark_intent_status(
        &self,
        reference: &str,
        status: IntentStatus,
        provider_response: JsonValue,
        provider_txn_id: Option<String>,
    ) -> Result<StatusUpdate, StoreError> {
        let previous: Option<String> = sqlx::query_scalar(
            r#"
            WITH target AS (
                SELECT id, status FROM payment_intents
                WHERE id::text = $1 OR idempotency_key = $1
                ORDER BY (id::text = $1) DESC
                LIMIT 1
                FOR UPDATE
            )
            UPDATE payment_intents p SET
                status = $2,
                provider_payload = $3,
                provider_txn_id = COALESCE($4, p.provider_txn_id),
                updated_at = now()
            FROM target
            WHERE p.id = target.id
              AND target.status IN ('created', 'pending')
            RETURNING target.status
            "#,
        )
        .bind(reference)
        .bind(status.as_str())
        .bind(&provider_response)
        .bind(provider_txn_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if let Some(previous) = previous {
            return Ok(StatusUpdate::Applied {
                from: parse_status(&previous)?,
                to: status,
            });
        }

        match self.current_status(reference).await? {
            Some(current) => Ok(StatusUpdate::Unchanged { current }),
            None => Err(StoreError::NotFound(reference.to_string())),
        }
    }

    async fn find_intent(&self, reference: &str) -> Result<Option<PaymentIntent>, StoreError> {
        let query = format!(
            r#"
            SELECT {INTENT_COLUMNS} FROM payment_intents
            WHERE id::text = $1 OR idempotency_key = $1
            ORDER BY (id::text = $1) DESC
            LIMIT 1
            "#
        );

        let row: Option<IntentRow> = sqlx::query_as(&query)
            .bind(reference)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(PaymentIntent::try_from).transpose()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}
