//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, error types, auth types, the state
//! machine trait and the event envelope that form the vocabulary of the
//! payment engine.

mod auth;
mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{
    domain_event, DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent,
};
pub use ids::{
    AddressId, DeliveryWindowId, OrderId, PaymentIntentId, PaymentMethodId, SubscriptionId,
    UserId,
};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
