//! Tern server entry point.
//!
//! Loads configuration from the environment, builds the runtime manager and
//! serves the administration API until Ctrl-C.

use std::sync::Arc;
use tern_core::RuntimeManager;
use tern_server::{http, ServerConfig, TernServer};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("tern_server=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Tern server");

    let config = ServerConfig::from_env()?;
    tracing::info!(?config, "Configuration loaded");

    // Warn-only so the server can start before credentials are in place
    config.validate_warn();

    let manager = Arc::new(RuntimeManager::new(config.provider.clone()));
    let server = TernServer::new(Arc::clone(&manager));

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
        tracing::info!("Received shutdown signal");
    };

    tracing::info!(
        http_addr = %config.http_addr,
        runtime = %manager.current_runtime(),
        "Server ready"
    );
    http::serve(server, config.http_addr, shutdown).await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
