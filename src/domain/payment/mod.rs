//! Payment domain - intents, providers, and webhook reconciliation rules.

mod errors;
mod idempotency;
mod intent;
mod money;
mod provider;
mod signature;
mod status;
mod webhook_errors;
mod webhook_profile;

pub use errors::IntentError;
pub use idempotency::IdempotencyKey;
pub use intent::{CheckoutHandle, LineItem, Order, PaymentIntent, StatusUpdate, DEFAULT_PURPOSE};
pub use money::Money;
pub use provider::{ProviderId, ProviderKind};
pub use signature::{sign_body, verify_signature, SignatureEncoding, WebhookSignatureVerifier};
pub use status::IntentStatus;
pub use webhook_errors::WebhookError;
pub use webhook_profile::WebhookProfile;
