//! Application layer - Commands and their handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    CreateIntentCommand, CreateIntentHandler, CreateIntentResult, ReconcileWebhookCommand,
    ReconcileWebhookHandler, ReconcileWebhookResult, RunBillingSweepCommand,
    RunBillingSweepHandler, SweepSettings,
};
