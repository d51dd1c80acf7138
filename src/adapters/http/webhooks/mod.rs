//! HTTP adapter for provider webhooks.
//!
//! - `POST /api/webhooks/{telebirr|chapa|arifpay}` - Signature-gated status callback

mod handlers;
mod routes;

pub use handlers::{receive_webhook, WebhooksAppState};
pub use routes::webhook_routes;
