//! HTTP adapter for the recurring billing sweep.
//!
//! - `POST /api/billing/run` - Called by the scheduler, gated by `X-Cron-Key` in live mode

mod handlers;
mod routes;

pub use handlers::{run_billing, BillingAppState, CRON_KEY_HEADER};
pub use routes::billing_routes;
