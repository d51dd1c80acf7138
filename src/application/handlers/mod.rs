//! Application handlers.
//!
//! Command handlers that orchestrate domain operations through ports.

pub mod billing;
pub mod payment;

pub use billing::{RunBillingSweepCommand, RunBillingSweepHandler, SweepSettings};
pub use payment::{
    CreateIntentCommand, CreateIntentHandler, CreateIntentResult, ReconcileWebhookCommand,
    ReconcileWebhookHandler, ReconcileWebhookResult,
};
