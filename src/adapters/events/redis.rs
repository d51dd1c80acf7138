//! Redis pub/sub event publisher.
//!
//! Each envelope is published as JSON on `events:{event_type}`. Subscribers
//! (the notification service for reminders) deduplicate on `event_id`.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::EventPublisher;

const CHANNEL_PREFIX: &str = "events";

#[derive(Clone)]
pub struct RedisEventPublisher {
    conn: MultiplexedConnection,
}

impl RedisEventPublisher {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    /// Opens a multiplexed connection to `url`.
    pub async fn connect(url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        Ok(Self::new(conn))
    }
}

/// Channel an event type is published on.
pub fn channel_for(event_type: &str) -> String {
    format!("{}:{}", CHANNEL_PREFIX, event_type)
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let payload = serde_json::to_string(&event)
            .map_err(|e| DomainError::new(ErrorCode::SerializationError, e.to_string()))?;
        let channel = channel_for(&event.event_type);

        let mut conn = self.conn.clone();
        let receivers: i64 = conn
            .publish(&channel, payload)
            .await
            .map_err(|e: redis::RedisError| {
                DomainError::new(ErrorCode::EventPublishError, e.to_string())
            })?;

        tracing::debug!(
            channel = %channel,
            event_id = %event.event_id,
            receivers,
            "event published"
        );
        Ok(())
    }
}
