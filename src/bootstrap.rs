//! Startup wiring: turns an `AppConfig` plus the chosen store, reader and
//! publisher into the HTTP state. Kept in the library so the wiring is
//! testable without a database.

use std::sync::Arc;

use secrecy::ExposeSecret;
use thiserror::Error;

use crate::adapters::auth::{JwtConfig, JwtSessionValidator};
use crate::adapters::http::billing::BillingAppState;
use crate::adapters::http::health::HealthAppState;
use crate::adapters::http::payments::PaymentsAppState;
use crate::adapters::http::webhooks::WebhooksAppState;
use crate::adapters::http::AppState;
use crate::adapters::providers::{
    ArifpayAdapter, ArifpayConfig, CashOnDeliveryAdapter, ChapaAdapter, ChapaConfig,
    TelebirrAdapter, TelebirrConfig,
};
use crate::application::handlers::billing::{RunBillingSweepHandler, SweepSettings};
use crate::application::handlers::payment::{CreateIntentHandler, ReconcileWebhookHandler};
use crate::config::{AppConfig, AuthConfig, BillingConfig, ProvidersConfig};
use crate::domain::billing::RunMode;
use crate::domain::foundation::ValidationError;
use crate::domain::payment::ProviderId;
use crate::ports::{BillingReader, EventPublisher, IntentStore, ProviderError, ProviderRegistry};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("provider setup failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("invalid setting: {0}")]
    Setting(#[from] ValidationError),
}

/// Installs the global tracing subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = fmt().with_env_filter(filter).with_target(true);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("tracing already initialized: {}", e);
    }
}

/// One adapter per configured rail. Cash on delivery needs no credentials.
pub fn provider_registry(config: &ProvidersConfig) -> Result<ProviderRegistry, ProviderError> {
    let mut registry = ProviderRegistry::new();

    if config.telebirr_configured() {
        if let (Some(app_id), Some(merchant_id), Some(app_key)) = (
            &config.telebirr_app_id,
            &config.telebirr_merchant_id,
            &config.telebirr_app_key,
        ) {
            registry.register(Arc::new(TelebirrAdapter::new(TelebirrConfig {
                app_id: app_id.clone(),
                merchant_id: merchant_id.clone(),
                app_key: app_key.clone(),
                placeholder_base: config.placeholder_checkout_base.clone(),
            })));
        }
    }

    if let Some(secret_key) = config.chapa_secret_key.as_ref().filter(|_| config.chapa_configured()) {
        registry.register(Arc::new(ChapaAdapter::new(ChapaConfig {
            secret_key: secret_key.clone(),
            api_base_url: config.chapa_api_base_url.clone(),
            default_customer_email: config.default_customer_email.clone(),
            default_first_name: config.default_first_name.clone(),
            timeout: config.timeout(),
        })?));
    }

    if let Some(public_key) = config.arifpay_public_key.as_ref().filter(|_| config.arifpay_configured()) {
        registry.register(Arc::new(ArifpayAdapter::new(ArifpayConfig {
            public_key: public_key.clone(),
            placeholder_base: config.placeholder_checkout_base.clone(),
        })));
    }

    if config.cod_enabled {
        registry.register(Arc::new(CashOnDeliveryAdapter));
    }

    tracing::info!(providers = ?registry.providers(), "provider registry built");
    Ok(registry)
}

/// A reconciler that accepts callbacks from every rail with a webhook secret.
pub fn webhook_reconciler(
    store: Arc<dyn IntentStore>,
    config: &ProvidersConfig,
) -> ReconcileWebhookHandler {
    let secrets = [
        (ProviderId::Telebirr, &config.telebirr_webhook_secret),
        (ProviderId::Chapa, &config.chapa_webhook_secret),
        (ProviderId::Arifpay, &config.arifpay_webhook_secret),
    ];

    secrets
        .into_iter()
        .filter_map(|(provider, secret)| {
            secret
                .as_ref()
                .filter(|s| !s.expose_secret().is_empty())
                .map(|s| (provider, s.clone()))
        })
        .fold(ReconcileWebhookHandler::new(store), |handler, (provider, secret)| {
            tracing::info!(provider = %provider, "webhooks enabled");
            handler.with_secret(provider, secret)
        })
}

pub fn sweep_settings(config: &BillingConfig) -> Result<SweepSettings, ValidationError> {
    Ok(SweepSettings {
        run_mode: config.run_mode.parse::<RunMode>()?,
        lookahead_days: config.lookahead_days,
        timezone: config.timezone.clone(),
        page_limit: config.page_limit,
        amount_cents: config.amount_cents,
        currency: config.currency.trim().to_ascii_uppercase(),
        purpose: config.purpose.clone(),
    })
}

pub fn session_validator(config: &AuthConfig) -> JwtSessionValidator {
    JwtSessionValidator::new(JwtConfig {
        secret: config.jwt_secret.clone(),
        issuer: config.issuer.clone(),
        audience: config.audience.clone(),
    })
}

/// Builds every handler and the HTTP state they are served from.
pub fn app_state(
    config: &AppConfig,
    store: Arc<dyn IntentStore>,
    reader: Arc<dyn BillingReader>,
    publisher: Arc<dyn EventPublisher>,
) -> Result<AppState, BootstrapError> {
    let create_intent = Arc::new(CreateIntentHandler::new(
        store.clone(),
        provider_registry(&config.providers)?,
        config.providers.return_url(),
    ));
    let reconciler = Arc::new(webhook_reconciler(store.clone(), &config.providers));
    let sweep = Arc::new(RunBillingSweepHandler::new(
        reader,
        create_intent.clone(),
        publisher,
        sweep_settings(&config.billing)?,
    ));

    Ok(AppState {
        payments: PaymentsAppState { create_intent },
        webhooks: WebhooksAppState { reconciler },
        billing: BillingAppState {
            sweep,
            trigger_key: config.billing.trigger_key.clone(),
        },
        health: HealthAppState { store },
        sessions: Arc::new(session_validator(&config.auth)),
    })
}
