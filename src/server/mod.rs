//! Server module for X-Ray
//!
//! Runs the reference trace store.
//!
//! # Module Structure
//!
//! - `config`: Configuration structures
//! - `loader`: Configuration loading from files and environment

pub mod config;
mod loader;

pub use config::AppConfig;
pub use loader::load_config;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tracing::info;
use xray_store::TraceRepository;

/// Run the reference store until Ctrl+C
pub async fn run(config: &AppConfig, port: Option<u16>) -> Result<()> {
    let db_path = config.store.database_path();
    let repo = TraceRepository::from_path(&db_path)
        .await
        .with_context(|| format!("Failed to open trace store at {}", db_path.display()))?;

    let port = port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", config.server.host, port)
        .parse()
        .context("Invalid server address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Trace store API at http://{}/api", addr);

    axum::serve(listener, xray_store::router(repo))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("X-Ray store shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
