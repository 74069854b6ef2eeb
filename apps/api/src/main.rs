//! # WebPOS API Server
//!
//! ## Startup
//! 1. `.env` → raw config (`WEBPOS_*`, optional `webpos.toml`)
//! 2. tracing (pretty or JSON), then profile checks
//! 3. SQLite pool + migrations
//! 4. bootstrap admin account
//! 5. serve until Ctrl+C / SIGTERM, then close the pool

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use webpos_api::config::{LogFormat, RawConfig};
use webpos_api::{build_app, AppState};
use webpos_db::{Database, DbConfig};

const DEFAULT_LOG_FILTER: &str = "webpos_api=debug,webpos_db=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let raw = RawConfig::load().context("failed to load configuration")?;
    init_tracing(raw.log_format);
    let config = raw.resolve().context("invalid configuration")?;

    info!(config = ?config, "Starting WebPOS API server");

    let db = Database::new(
        DbConfig::new(config.database_path.clone()).max_connections(config.max_connections),
    )
    .await
    .with_context(|| format!("failed to open {}", config.database_path.display()))?;

    let state = AppState::new(db.clone(), config.clone())?;

    state
        .sessions
        .bootstrap_admin(&config.admin_username, &config.admin_password)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bootstrap admin account: {e}"))?;

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    match format {
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
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

    info!("Shutdown signal received");
}
