//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, errors, events, auth)
//! - `payment` - Orders, payment intents, providers and webhook rules
//! - `billing` - Due subscriptions and the recurring billing sweep

pub mod billing;
pub mod foundation;
pub mod payment;
