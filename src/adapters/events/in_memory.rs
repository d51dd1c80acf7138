//! In-memory event bus.
//!
//! Captures published events for assertions and can be told to fail, which
//! is how tests exercise the sweep's per-subscription error notes. Not for
//! production: nothing leaves the process.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::EventPublisher;

/// In-memory event bus for tests and local development.
///
/// ```ignore
/// let bus = Arc::new(InMemoryEventBus::new());
/// bus.publish(envelope).await?;
/// assert!(bus.has_event("billing.reminder_due.v1"));
/// ```
#[derive(Default)]
pub struct InMemoryEventBus {
    published: RwLock<Vec<EventEnvelope>>,
    failure: RwLock<Option<String>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Returns all published events.
    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.published.read().map(|p| p.clone()).unwrap_or_default()
    }

    /// Returns events of a specific type.
    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Returns events for a specific aggregate.
    pub fn events_for_aggregate(&self, aggregate_id: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.published.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn has_event(&self, event_type: &str) -> bool {
        !self.events_of_type(event_type).is_empty()
    }

    /// Clears all published events.
    pub fn clear(&self) {
        if let Ok(mut published) = self.published.write() {
            published.clear();
        }
    }

    /// Makes every subsequent publish fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = Some(message.into());
        }
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        if let Some(message) = self.failure.read().ok().and_then(|f| f.clone()) {
            return Err(DomainError::new(ErrorCode::EventPublishError, message));
        }

        self.published
            .write()
            .map_err(|_| {
                DomainError::new(ErrorCode::EventPublishError, "event bus lock poisoned")
            })?
            .push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_envelope(event_type: &str, aggregate_id: &str) -> EventEnvelope {
        EventEnvelope::new(event_type, aggregate_id, "Subscription", json!({}))
    }

    #[tokio::test]
    async fn publish_stores_event() {
        let bus = InMemoryEventBus::new();
        bus.publish(test_envelope("billing.reminder_due.v1", "sub-1"))
            .await
            .unwrap();

        assert_eq!(bus.event_count(), 1);
        assert!(bus.has_event("billing.reminder_due.v1"));
        assert_eq!(bus.events_for_aggregate("sub-1").len(), 1);
    }

    #[tokio::test]
    async fn events_of_type_filters_correctly() {
        let bus = InMemoryEventBus::new();
        bus.publish(test_envelope("a.v1", "x")).await.unwrap();
        bus.publish(test_envelope("b.v1", "x")).await.unwrap();

        assert_eq!(bus.events_of_type("a.v1").len(), 1);
    }

    #[tokio::test]
    async fn clear_removes_all_events() {
        let bus = InMemoryEventBus::new();
        bus.publish(test_envelope("a.v1", "x")).await.unwrap();
        bus.clear();
        assert_eq!(bus.event_count(), 0);
    }

    #[tokio::test]
    async fn failing_bus_records_nothing() {
        let bus = InMemoryEventBus::new();
        bus.fail_with("redis down");

        let err = bus.publish(test_envelope("a.v1", "x")).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::EventPublishError);
        assert_eq!(bus.event_count(), 0);
    }
}
