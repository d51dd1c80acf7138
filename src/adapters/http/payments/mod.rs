//! HTTP adapter for payment intents.
//!
//! - `POST /api/payments/intents` - Create an order and its payment intent

mod dto;
mod handlers;
mod routes;

pub use dto::{CreateIntentRequest, CreateIntentResponse};
pub use handlers::{create_intent, PaymentsAppState};
pub use routes::payment_routes;
