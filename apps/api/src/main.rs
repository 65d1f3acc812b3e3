//! # Shopfloor API
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        API Server                                       │
//! │                                                                         │
//! │  Till / back office ───► HTTP (8080) ───► Routes ───► SQLite          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use shopfloor_api::{app, ApiConfig, AppState};
use shopfloor_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("Starting Shopfloor API server...");

    // Load configuration
    let config = ApiConfig::load().context("invalid configuration")?;
    info!(
        port = config.http_port,
        database = %config.database_path,
        "Configuration loaded"
    );
    if config.uses_dev_secret() {
        warn!("JWT_SECRET not set, using the development secret");
    }

    // Open database (runs migrations)
    let db_config = DbConfig::new(&config.database_path).max_connections(config.db_max_connections);
    let db = Database::new(db_config)
        .await
        .context("failed to open database")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let state = AppState::new(db.clone(), config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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
