//! Authentication adapters implementing `SessionValidator`.
//!
//! - `JwtSessionValidator` - HS256 bearer tokens with issuer/audience/expiry checks
//! - `MockSessionValidator` - Fixed token table for tests

mod jwt;
mod mock;

pub use jwt::{JwtConfig, JwtSessionValidator, SessionClaims};
pub use mock::MockSessionValidator;
