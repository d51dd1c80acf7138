//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Session token validation (JWT, mock)
//! - `events` - Event publishers (in-memory, Redis pub/sub)
//! - `http` - Axum routers and handlers
//! - `memory` - In-memory store and billing reader for tests and local runs
//! - `postgres` - PostgreSQL store and billing reader
//! - `providers` - One adapter per payment rail

pub mod auth;
pub mod events;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod providers;

pub use events::{InMemoryEventBus, RedisEventPublisher};
