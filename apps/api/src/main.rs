//! # Bazaar API Server
//!
//! Entry point for the cart and order HTTP server.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. tracing subscriber                                                  │
//! │  2. ApiConfig::from_env()                                               │
//! │  3. storage = memory ─► AppState::new (empty catalog)                   │
//! │     storage = sqlite ─► Database::new ─► migrations ─► AppState::persistent
//! │  4. bind, serve until Ctrl+C / SIGTERM                                  │
//! │  5. close the pool                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use bazaar_api::{
    init_tracing, router, ApiConfig, AppState, ConfigError, StaticCatalog, StorageMode,
};
use bazaar_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting Bazaar API server...");

    let config = ApiConfig::from_env()?;
    info!(
        addr = %config.bind_address(),
        storage = %config.storage,
        stock_policy = ?config.stock_policy,
        status_policy = ?config.status_policy,
        "Configuration loaded"
    );

    let (state, db) = match config.storage {
        StorageMode::Memory => {
            let state = AppState::new(
                Arc::new(StaticCatalog::new()),
                config.stock_policy,
                config.status_policy,
            );
            (state, None)
        }
        StorageMode::Sqlite => {
            let path = config
                .db_path
                .as_deref()
                .ok_or_else(|| ConfigError::MissingRequired("BAZAAR_DB_PATH".to_string()))?;

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let db = Database::new(
                DbConfig::new(path).max_connections(config.db_max_connections),
            )
            .await?;
            info!(path = %path.display(), "Database ready");

            let state =
                AppState::persistent(db.clone(), config.stock_policy, config.status_policy).await?;
            (state, Some(db))
        }
    };

    let listener = TcpListener::bind(config.bind_address()).await?;
    info!(addr = %config.bind_address(), "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = db {
        db.close().await;
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
                error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
