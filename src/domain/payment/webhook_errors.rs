//! Webhook reconciliation error types.
//!
//! Status codes drive provider retry behavior: 2xx acknowledges, 4xx tells
//! the provider not to retry, 5xx asks it to retry later.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur while reconciling a provider callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// Signature header missing or not matching the body.
    #[error("invalid signature")]
    InvalidSignature,

    /// Body is not JSON.
    #[error("malformed payload")]
    MalformedPayload(String),

    /// No intent reference in any documented location.
    #[error("no intent")]
    UnresolvableIntent,

    /// The reference does not match any stored intent.
    #[error("no intent")]
    IntentNotFound(String),

    /// No webhook profile or secret for this provider.
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Store failed while applying the update.
    #[error("store error: {0}")]
    Store(String),
}

impl WebhookError {
    pub fn malformed(message: impl Into<String>) -> Self {
        WebhookError::MalformedPayload(message.into())
    }

    pub fn store(message: impl Into<String>) -> Self {
        WebhookError::Store(message.into())
    }

    /// Returns true if the provider should redeliver.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Store(_))
    }

    /// Maps the error to an HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature => StatusCode::FORBIDDEN,
            WebhookError::MalformedPayload(_)
            | WebhookError::UnresolvableIntent
            | WebhookError::IntentNotFound(_) => StatusCode::BAD_REQUEST,
            WebhookError::UnsupportedProvider(_) => StatusCode::NOT_FOUND,
            WebhookError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_bodies_match_provider_contract() {
        assert_eq!(WebhookError::InvalidSignature.to_string(), "invalid signature");
        assert_eq!(WebhookError::malformed("eof").to_string(), "malformed payload");
        assert_eq!(WebhookError::UnresolvableIntent.to_string(), "no intent");
        assert_eq!(WebhookError::IntentNotFound("abc".into()).to_string(), "no intent");
    }

    #[test]
    fn status_codes() {
        assert_eq!(WebhookError::InvalidSignature.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(WebhookError::malformed("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(WebhookError::UnresolvableIntent.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            WebhookError::IntentNotFound("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::UnsupportedProvider("cod".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            WebhookError::store("down").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn only_store_failures_are_retryable() {
        assert!(WebhookError::store("down").is_retryable());
        assert!(!WebhookError::InvalidSignature.is_retryable());
        assert!(!WebhookError::UnresolvableIntent.is_retryable());
    }
}
