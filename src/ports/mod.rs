//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `IntentStore` - Orders and payment intents (write side)
//! - `BillingReader` - Subscriptions, payment methods and provider catalog
//! - `ProviderAdapter` - Checkout initiation with one payment rail
//! - `EventPublisher` - Domain event delivery
//! - `SessionValidator` - Bearer token validation

mod billing_reader;
mod event_publisher;
mod intent_store;
mod provider_adapter;
mod session_validator;

pub use billing_reader::BillingReader;
pub use event_publisher::EventPublisher;
pub use intent_store::{CreateOutcome, IntentStore, StoreError};
pub use provider_adapter::{
    IntentContext, ProviderAdapter, ProviderError, ProviderErrorCode, ProviderRegistry,
};
pub use session_validator::SessionValidator;
