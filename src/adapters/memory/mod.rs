//! In-memory store adapters for tests and local development.

mod billing_reader;
mod intent_store;

pub use billing_reader::InMemoryBillingReader;
pub use intent_store::InMemoryIntentStore;
