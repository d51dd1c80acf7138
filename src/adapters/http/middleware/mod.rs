//! HTTP middleware for axum.
//!
//! - `auth` - Bearer token validation and the optional-caller extractor

pub mod auth;

pub use auth::{auth_middleware, AuthState, OptionalAuth};
