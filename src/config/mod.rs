//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PAYMENT_ORCHESTRATOR` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use payment_orchestrator::config::AppConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! config.validate()?;
//!
//! println!("Server running on {}", config.server.socket_addr()?);
//! # Ok(())
//! # }
//! ```

mod auth;
mod billing;
mod database;
mod error;
mod providers;
mod redis;
mod server;

pub use auth::AuthConfig;
pub use billing::BillingConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use providers::ProvidersConfig;
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Redis configuration (event pub/sub). Absent means in-process events.
    #[serde(default)]
    pub redis: Option<RedisConfig>,

    /// Session token configuration
    pub auth: AuthConfig,

    /// Payment provider credentials and webhook secrets
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Recurring billing sweep
    #[serde(default)]
    pub billing: BillingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PAYMENT_ORCHESTRATOR` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PAYMENT_ORCHESTRATOR__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PAYMENT_ORCHESTRATOR__PROVIDERS__CHAPA_SECRET_KEY=...` -> `providers.chapa_secret_key`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PAYMENT_ORCHESTRATOR")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        if let Some(redis) = &self.redis {
            redis.validate()?;
        }
        self.auth.validate()?;
        self.providers.validate()?;
        self.billing.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const MINIMAL: &[(&str, &str)] = &[
        (
            "PAYMENT_ORCHESTRATOR__DATABASE__URL",
            "postgresql://test@localhost/test",
        ),
        (
            "PAYMENT_ORCHESTRATOR__AUTH__JWT_SECRET",
            "0123456789abcdef0123456789abcdef",
        ),
    ];

    const OPTIONAL: &[&str] = &[
        "PAYMENT_ORCHESTRATOR__SERVER__PORT",
        "PAYMENT_ORCHESTRATOR__SERVER__ENVIRONMENT",
        "PAYMENT_ORCHESTRATOR__REDIS__URL",
        "PAYMENT_ORCHESTRATOR__PROVIDERS__CHAPA_SECRET_KEY",
        "PAYMENT_ORCHESTRATOR__PROVIDERS__RETURN_HOST",
        "PAYMENT_ORCHESTRATOR__BILLING__RUN_MODE",
        "PAYMENT_ORCHESTRATOR__BILLING__TRIGGER_KEY",
    ];

    /// Helper to set environment variables for testing
    fn set_minimal_env() {
        for (key, value) in MINIMAL {
            env::set_var(key, value);
        }
    }

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for (key, _) in MINIMAL {
            env::remove_var(key);
        }
        for key in OPTIONAL {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.database.url(), "postgresql://test@localhost/test");
        assert!(config.redis.is_none());
    }

    #[test]
    fn test_validate_minimal_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_section_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.billing.run_mode, "dry");
        assert_eq!(config.billing.lookahead_days, 3);
        assert_eq!(
            config.providers.return_url(),
            "https://return.yenefresh.com/pay/return"
        );
        assert!(!config.providers.chapa_configured());
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("PAYMENT_ORCHESTRATOR__SERVER__PORT", "3000");
        env::set_var("PAYMENT_ORCHESTRATOR__REDIS__URL", "redis://localhost:6379");
        env::set_var("PAYMENT_ORCHESTRATOR__PROVIDERS__CHAPA_SECRET_KEY", "CHASECK_TEST-x");
        env::set_var("PAYMENT_ORCHESTRATOR__PROVIDERS__RETURN_HOST", "staging.yenefresh.com");
        env::set_var("PAYMENT_ORCHESTRATOR__BILLING__RUN_MODE", "live");
        env::set_var("PAYMENT_ORCHESTRATOR__BILLING__TRIGGER_KEY", "cron-secret");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(
            config.redis.as_ref().map(|r| r.url()),
            Some("redis://localhost:6379")
        );
        assert!(config.providers.chapa_configured());
        assert_eq!(
            config
                .providers
                .chapa_secret_key
                .as_ref()
                .map(|s| s.expose_secret().clone()),
            Some("CHASECK_TEST-x".to_string())
        );
        assert_eq!(
            config.providers.return_url(),
            "https://staging.yenefresh.com/pay/return"
        );
        assert_eq!(config.billing.run_mode, "live");
        assert_eq!(config.billing.trigger_key(), Some("cron-secret"));
    }

    #[test]
    fn test_missing_jwt_secret_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var(MINIMAL[0].0, MINIMAL[0].1);
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_err());
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("PAYMENT_ORCHESTRATOR__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
    }
}
