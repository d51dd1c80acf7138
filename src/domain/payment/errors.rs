//! Intent creation error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Unauthorized | 401 |
//! | BadRequest | 400 |
//! | UnknownProvider | 400 |
//! | KeyConflict | 403 |
//! | Store | 400 |
//! | ProviderInit | 500 |
//! | Internal | 500 |

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Errors surfaced by the intent orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    /// No authenticated caller.
    #[error("Unauthorized")]
    Unauthorized,

    /// The request failed validation.
    #[error("Invalid {field}: {message}")]
    BadRequest { field: String, message: String },

    /// No adapter is registered for the requested provider.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// The idempotency key is already held by another user's intent.
    #[error("Idempotency key is not available")]
    KeyConflict,

    /// The store refused to create or read the order/intent pair.
    #[error("Store error: {0}")]
    Store(String),

    /// The provider adapter failed to initiate checkout.
    #[error("Provider initialization failed: {0}")]
    ProviderInit(String),

    /// Unexpected failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntentError {
    pub fn bad_request(field: impl Into<String>, message: impl Into<String>) -> Self {
        IntentError::BadRequest {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn unknown_provider(provider: impl Into<String>) -> Self {
        IntentError::UnknownProvider(provider.into())
    }

    pub fn store(message: impl Into<String>) -> Self {
        IntentError::Store(message.into())
    }

    pub fn provider_init(message: impl Into<String>) -> Self {
        IntentError::ProviderInit(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        IntentError::Internal(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            IntentError::Unauthorized => ErrorCode::Unauthorized,
            IntentError::KeyConflict => ErrorCode::Forbidden,
            IntentError::BadRequest { .. } | IntentError::UnknownProvider(_) => {
                ErrorCode::ValidationFailed
            }
            IntentError::Store(_) => ErrorCode::DatabaseError,
            IntentError::ProviderInit(_) | IntentError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Maps the error to an HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            IntentError::Unauthorized => StatusCode::UNAUTHORIZED,
            IntentError::KeyConflict => StatusCode::FORBIDDEN,
            IntentError::BadRequest { .. }
            | IntentError::UnknownProvider(_)
            | IntentError::Store(_) => StatusCode::BAD_REQUEST,
            IntentError::ProviderInit(_) | IntentError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// A caller may resubmit with the same idempotency key after these.
    pub fn is_retryable(&self) -> bool {
        matches!(self, IntentError::ProviderInit(_))
    }
}

impl From<ValidationError> for IntentError {
    fn from(err: ValidationError) -> Self {
        IntentError::bad_request(err.field().to_string(), err.to_string())
    }
}

impl From<IntentError> for DomainError {
    fn from(err: IntentError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
