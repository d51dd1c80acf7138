use std::sync::Arc;

use tokio::signal;
use tracing::{error, info, warn};

use payment_orchestrator::adapters::events::{InMemoryEventBus, RedisEventPublisher};
use payment_orchestrator::adapters::http::{api_router, with_http_layers};
use payment_orchestrator::adapters::postgres::{self, PostgresBillingReader, PostgresIntentStore};
use payment_orchestrator::bootstrap;
use payment_orchestrator::config::AppConfig;
use payment_orchestrator::ports::EventPublisher;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    bootstrap::init_tracing(&config.server.log_level, config.server.log_json());
    config.validate()?;

    // Database
    let pool = postgres::connect(&config.database).await?;
    if config.database.run_migrations {
        postgres::migrate(&pool).await.map_err(|e| {
            error!("Failed running migrations: {}", e);
            e
        })?;
    }
    let store = Arc::new(PostgresIntentStore::new(pool.clone()));
    let reader = Arc::new(PostgresBillingReader::new(pool));

    // Events
    let publisher: Arc<dyn EventPublisher> = match &config.redis {
        Some(redis) => {
            let connect = RedisEventPublisher::connect(redis.url());
            match tokio::time::timeout(redis.connect_timeout(), connect).await {
                Ok(Ok(publisher)) => Arc::new(publisher),
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => return Err("timed out connecting to Redis".into()),
            }
        }
        None => {
            warn!("No Redis configured; billing reminders stay in process");
            Arc::new(InMemoryEventBus::new())
        }
    };

    let state = bootstrap::app_state(&config, store, reader, publisher)?;
    let app = with_http_layers(
        api_router(state),
        config.server.request_timeout(),
        &config.server.cors_origins_list(),
    );

    let addr = config.server.socket_addr()?;
    info!(
        %addr,
        production = config.is_production(),
        billing_mode = %config.billing.run_mode,
        "payment orchestrator listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
