//! EventPublisher port - handing domain events to the outside world.
//!
//! The billing sweep raises reminder events through this port without knowing
//! whether they land on an in-memory bus or a Redis channel.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events.
///
/// Delivery is at-least-once; consumers deduplicate on `event_id`. Errors are
/// returned to the caller, which decides whether the failure is fatal.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publish several events, in order. Stops at the first failure.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}
