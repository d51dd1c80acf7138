//! Payment command handlers.

mod create_intent;
mod reconcile_webhook;

pub use create_intent::{CreateIntentCommand, CreateIntentHandler, CreateIntentResult};
pub use reconcile_webhook::{
    ReconcileWebhookCommand, ReconcileWebhookHandler, ReconcileWebhookResult,
};
