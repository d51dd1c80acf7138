//! Payment Orchestrator - payment intents, provider callbacks and recurring
//! billing for a meal-kit storefront.
//!
//! The crate follows a hexagonal layout: `domain` holds the rules, `ports`
//! the contracts, `application` the command handlers and `adapters` the
//! HTTP, database, provider and event implementations.

pub mod adapters;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;
