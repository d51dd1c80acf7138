//! PostgreSQL adapters - Database implementations for the store ports.
//!
//! - `PostgresIntentStore` - Orders and payment intents
//! - `PostgresBillingReader` - Subscriptions, payment methods, provider catalog

mod billing_reader;
mod intent_store;

pub use billing_reader::PostgresBillingReader;
pub use intent_store::PostgresIntentStore;

use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;

/// Builds the connection pool described by `config`.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let options = PgConnectOptions::from_str(config.url())?
        .options([("statement_timeout", config.statement_timeout())]);

    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .connect_with(options)
        .await
}

/// Applies the bundled schema migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
