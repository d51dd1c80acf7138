//! JSON error bodies shared by the HTTP adapters.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::payment::IntentError;

/// Error response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

/// API error type that converts intent errors to HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub IntentError);

impl From<IntentError> for ApiError {
    fn from(err: IntentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let error_code = match &self.0 {
            IntentError::Unauthorized => "UNAUTHORIZED",
            IntentError::KeyConflict => "IDEMPOTENCY_KEY_CONFLICT",
            IntentError::BadRequest { .. } => "VALIDATION_FAILED",
            IntentError::UnknownProvider(_) => "UNKNOWN_PROVIDER",
            IntentError::Store(_) => "STORE_ERROR",
            IntentError::ProviderInit(_) => "PROVIDER_INIT_FAILED",
            IntentError::Internal(_) => "INTERNAL_ERROR",
        };

        let body = match &self.0 {
            IntentError::BadRequest { field, .. } => ErrorResponse::with_details(
                error_code,
                self.0.to_string(),
                serde_json::json!({ "field": field }),
            ),
            IntentError::ProviderInit(_) => ErrorResponse::with_details(
                error_code,
                self.0.to_string(),
                serde_json::json!({ "retryable": true }),
            ),
            other => ErrorResponse::new(error_code, other.to_string()),
        };

        (status, Json(body)).into_response()
    }
}
