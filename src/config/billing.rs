//! Billing sweep configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Recurring billing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// `dry` reports only, `live` creates intents and reminders
    #[serde(default = "default_run_mode")]
    pub run_mode: String,

    /// Days past today whose invoices count as due
    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: u32,

    /// Reported in sweep summaries
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Shared key the scheduler presents in `X-Cron-Key`
    pub trigger_key: Option<SecretString>,

    /// Upper bound on subscriptions read per sweep
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,

    /// Charge per billed subscription, in minor units
    #[serde(default = "default_amount_cents")]
    pub amount_cents: i64,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_purpose")]
    pub purpose: String,
}

impl BillingConfig {
    /// Configured trigger key, ignoring a blank one
    pub fn trigger_key(&self) -> Option<&str> {
        self.trigger_key
            .as_ref()
            .map(|k| k.expose_secret().as_str())
            .filter(|k| !k.is_empty())
    }

    /// Validate billing configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mode = self.run_mode.trim().to_ascii_lowercase();
        if mode != "dry" && mode != "live" {
            return Err(ValidationError::InvalidBilling {
                field: "run_mode",
                reason: format!("expected 'dry' or 'live', got '{}'", self.run_mode),
            });
        }
        if self.lookahead_days > 31 {
            return Err(ValidationError::InvalidBilling {
                field: "lookahead_days",
                reason: "must be at most 31".to_string(),
            });
        }
        if self.page_limit == 0 {
            return Err(ValidationError::InvalidBilling {
                field: "page_limit",
                reason: "must be positive".to_string(),
            });
        }
        if self.amount_cents <= 0 {
            return Err(ValidationError::InvalidBilling {
                field: "amount_cents",
                reason: "must be positive".to_string(),
            });
        }
        if self.currency.trim().len() != 3 {
            return Err(ValidationError::InvalidBilling {
                field: "currency",
                reason: "must be a three-letter code".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            run_mode: default_run_mode(),
            lookahead_days: default_lookahead_days(),
            timezone: default_timezone(),
            trigger_key: None,
            page_limit: default_page_limit(),
            amount_cents: default_amount_cents(),
            currency: default_currency(),
            purpose: default_purpose(),
        }
    }
}

fn default_run_mode() -> String {
    "dry".to_string()
}

fn default_lookahead_days() -> u32 {
    3
}

fn default_timezone() -> String {
    "Africa/Addis_Ababa".to_string()
}

fn default_page_limit() -> u32 {
    500
}

fn default_amount_cents() -> i64 {
    50_000
}

fn default_currency() -> String {
    "ETB".to_string()
}

fn default_purpose() -> String {
    "weekly_box".to_string()
}
