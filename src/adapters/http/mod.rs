//! HTTP adapters - REST API implementations.
//!
//! Each feature has its own router and state; `router` mounts them.

pub mod billing;
pub mod error;
pub mod health;
pub mod middleware;
pub mod payments;
pub mod router;
pub mod webhooks;

pub use error::{ApiError, ErrorResponse};
pub use router::{api_router, with_http_layers, AppState};
