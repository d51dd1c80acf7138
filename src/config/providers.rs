//! Payment provider configuration
//!
//! Every rail is optional: a rail without credentials gets no adapter and
//! intents for it are rejected as an unknown provider. Webhook secrets are
//! separate from API credentials because a provider's callbacks can be
//! enabled before its checkout is.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Provider credentials, webhook secrets and checkout defaults
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    /// Host the customer returns to after hosted checkout
    #[serde(default = "default_return_host")]
    pub return_host: String,

    /// Base of placeholder checkout links for rails not yet integrated
    #[serde(default = "default_placeholder_base")]
    pub placeholder_checkout_base: String,

    /// Email sent to hosted checkouts when the caller has none
    #[serde(default = "default_customer_email")]
    pub default_customer_email: String,

    /// First name sent to hosted checkouts when the caller has none
    #[serde(default = "default_first_name")]
    pub default_first_name: String,

    /// Outbound provider call timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    pub telebirr_app_id: Option<String>,
    pub telebirr_merchant_id: Option<String>,
    pub telebirr_app_key: Option<SecretString>,
    pub telebirr_webhook_secret: Option<SecretString>,

    pub chapa_secret_key: Option<SecretString>,
    #[serde(default = "default_chapa_api_base_url")]
    pub chapa_api_base_url: String,
    pub chapa_webhook_secret: Option<SecretString>,

    pub arifpay_public_key: Option<String>,
    pub arifpay_webhook_secret: Option<SecretString>,

    /// Register the cash-on-delivery rail
    #[serde(default = "default_true")]
    pub cod_enabled: bool,
}

impl ProvidersConfig {
    /// Where hosted checkouts send the customer back to
    pub fn return_url(&self) -> String {
        format!("https://{}/pay/return", self.return_host)
    }

    /// Get provider timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// True when both telebirr identifiers and its key are present
    pub fn telebirr_configured(&self) -> bool {
        non_blank(&self.telebirr_app_id)
            && non_blank(&self.telebirr_merchant_id)
            && secret_present(&self.telebirr_app_key)
    }

    pub fn chapa_configured(&self) -> bool {
        secret_present(&self.chapa_secret_key)
    }

    pub fn arifpay_configured(&self) -> bool {
        non_blank(&self.arifpay_public_key)
    }

    /// Validate provider configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.return_host.trim().is_empty() || self.return_host.contains('/') {
            return Err(ValidationError::InvalidProvider {
                field: "return_host",
                reason: "must be a bare host name".to_string(),
            });
        }
        if !self.placeholder_checkout_base.starts_with("https://") {
            return Err(ValidationError::InvalidProvider {
                field: "placeholder_checkout_base",
                reason: "must be an https URL".to_string(),
            });
        }
        if !self.chapa_api_base_url.starts_with("https://")
            && !self.chapa_api_base_url.starts_with("http://localhost")
        {
            return Err(ValidationError::InvalidProvider {
                field: "chapa_api_base_url",
                reason: "must be an https URL".to_string(),
            });
        }
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            return_host: default_return_host(),
            placeholder_checkout_base: default_placeholder_base(),
            default_customer_email: default_customer_email(),
            default_first_name: default_first_name(),
            timeout_secs: default_timeout(),
            telebirr_app_id: None,
            telebirr_merchant_id: None,
            telebirr_app_key: None,
            telebirr_webhook_secret: None,
            chapa_secret_key: None,
            chapa_api_base_url: default_chapa_api_base_url(),
            chapa_webhook_secret: None,
            arifpay_public_key: None,
            arifpay_webhook_secret: None,
            cod_enabled: true,
        }
    }
}

fn non_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(false, |v| !v.trim().is_empty())
}

fn secret_present(value: &Option<SecretString>) -> bool {
    value
        .as_ref()
        .map_or(false, |s| !s.expose_secret().trim().is_empty())
}

fn default_return_host() -> String {
    "return.yenefresh.com".to_string()
}

fn default_placeholder_base() -> String {
    "https://example.com".to_string()
}

fn default_customer_email() -> String {
    "customer@yenefresh.com".to_string()
}

fn default_first_name() -> String {
    "YeneFresh".to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_chapa_api_base_url() -> String {
    "https://api.chapa.co".to_string()
}

fn default_true() -> bool {
    true
}
