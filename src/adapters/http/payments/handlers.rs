//! HTTP handlers for payment intent endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::OptionalAuth;
use crate::application::handlers::payment::CreateIntentHandler;
use crate::domain::payment::IntentError;

use super::dto::{CreateIntentRequest, CreateIntentResponse};

/// Dependencies of the payment routes.
#[derive(Clone)]
pub struct PaymentsAppState {
    pub create_intent: Arc<CreateIntentHandler>,
}

/// POST /api/payments/intents - Create an order and start checkout
pub async fn create_intent(
    State(state): State<PaymentsAppState>,
    OptionalAuth(caller): OptionalAuth,
    payload: Result<Json<CreateIntentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    // An anonymous caller learns nothing about the body schema.
    if caller.is_none() {
        return Err(IntentError::Unauthorized.into());
    }
    let Json(request) =
        payload.map_err(|rejection| IntentError::bad_request("body", rejection.body_text()))?;

    let cmd = request.into_command(caller)?;
    let result = state.create_intent.handle(cmd).await?;

    Ok(Json(CreateIntentResponse::from(result)))
}
