//! Roast Me server.
//!
//! Wires the store, session hub, and link service together, runs the
//! expiry sweeper on its schedule, and waits for a shutdown signal.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use roastme_core::config::AppConfig;
use roastme_core::error::AppError;
use roastme_core::types::{Clock, SystemClock};
use roastme_realtime::SessionHub;
use roastme_service::LinkService;
use roastme_store::StoreManager;
use roastme_worker::{CronScheduler, ExpirySweeper};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file, environment overlay, and variables
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("ROASTME_CONFIG").unwrap_or_else(|_| "config/default".to_string());
    let env = std::env::var("ROASTME_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load(&config_path, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Roast Me v{}", env!("CARGO_PKG_VERSION"));

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    tracing::info!("Initializing store (provider: {})...", config.store.provider);
    let stores = StoreManager::new(&config.store, Arc::clone(&clock)).await?;
    if !stores.health_check().await? {
        return Err(AppError::storage("Store health check failed"));
    }

    let hub = Arc::new(SessionHub::new(config.realtime.channel_capacity));
    let links = Arc::new(LinkService::new(
        &stores,
        Arc::clone(&hub),
        Arc::clone(&clock),
        config.link.clone(),
    ));
    tracing::info!(
        ttl_seconds = config.link.ttl_seconds,
        id_length = config.link.id_length,
        "Link service initialized"
    );

    let mut scheduler = if config.worker.enabled {
        let sweeper = ExpirySweeper::new(Arc::clone(&links));
        // Reclaim anything left over from a previous run.
        sweeper.run_once().await?;

        let scheduler = CronScheduler::new().await?;
        scheduler
            .register_expiry_sweep(&config.worker.sweep_cron, sweeper)
            .await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Expiry sweeper disabled");
        None
    };

    tracing::info!("Roast Me ready");
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");

    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }

    tracing::info!(
        open_sessions = hub.channel_count(),
        "Roast Me shut down gracefully"
    );
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
