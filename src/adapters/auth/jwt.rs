//! Shared-secret JWT session validator.
//!
//! Validates HS256 bearer tokens issued by the platform's auth service.
//! Issuer, audience and expiry are always checked.

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Configuration for the JWT validator.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: SecretString,
    pub issuer: String,
    pub audience: String,
}

/// Claims we read from a token.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject - the user ID
    pub sub: String,
    pub iss: String,
    pub aud: String,
    /// Expiry (Unix epoch seconds)
    pub exp: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

pub struct JwtSessionValidator {
    config: JwtConfig,
    decoding_key: DecodingKey,
}

impl JwtSessionValidator {
    pub fn new(config: JwtConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.secret.expose_secret().as_bytes());
        Self {
            config,
            decoding_key,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation())
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        tracing::debug!("Token expired");
                        AuthError::TokenExpired
                    }
                    ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => {
                        tracing::warn!(error = %e, "token issued for someone else");
                        AuthError::InvalidToken
                    }
                    _ => {
                        tracing::warn!(error = %e, "token validation failed");
                        AuthError::InvalidToken
                    }
                }
            })?;

        let claims = data.claims;
        let user_id = UserId::new(claims.sub).map_err(|_| {
            tracing::warn!("token has a blank subject");
            AuthError::InvalidToken
        })?;

        Ok(AuthenticatedUser::new(user_id, claims.email, claims.name))
    }
}

impl std::fmt::Debug for JwtSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionValidator")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-signing-secret";

    fn validator() -> JwtSessionValidator {
        JwtSessionValidator::new(JwtConfig {
            secret: SecretString::new(SECRET.to_string()),
            issuer: "https://auth.yenefresh.com".to_string(),
            audience: "payments".to_string(),
        })
    }

    fn claims(exp_offset: i64) -> SessionClaims {
        SessionClaims {
            sub: "user-42".to_string(),
            iss: "https://auth.yenefresh.com".to_string(),
            aud: "payments".to_string(),
            exp: chrono::Utc::now().timestamp() + exp_offset,
            email: Some("abebe@example.com".to_string()),
            name: Some("Abebe".to_string()),
        }
    }

    fn sign(claims: &SessionClaims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn valid_token_yields_user() {
        let user = validator().validate(&sign(&claims(3600), SECRET)).await.unwrap();

        assert_eq!(user.id.as_str(), "user-42");
        assert_eq!(user.email.as_deref(), Some("abebe@example.com"));
        assert_eq!(user.display_name.as_deref(), Some("Abebe"));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let result = validator().validate(&sign(&claims(-3600), SECRET)).await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected() {
        let result = validator().validate(&sign(&claims(3600), "other")).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn wrong_audience_is_rejected() {
        let mut c = claims(3600);
        c.aud = "dashboard".to_string();
        let result = validator().validate(&sign(&c, SECRET)).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn garbage_is_rejected() {
        let result = validator().validate("not.a.jwt").await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn debug_hides_secret() {
        let debug = format!("{:?}", validator());
        assert!(!debug.contains(SECRET));
    }
}
