use anyhow::Context;
use kvgate_server::config::ServerConfig;
use kvgate_server::node::Node;
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "kvgate.yaml".to_string());

    // Try file first, fall back to env
    let config = if std::path::Path::new(&config_path).exists() {
        info!("Loading configuration from: {}", config_path);
        ServerConfig::load_from_file(&config_path)
            .with_context(|| format!("loading {}", config_path))?
    } else {
        info!("Config file {} not found, loading from environment variables", config_path);
        ServerConfig::load_from_env().context("loading configuration from environment")?
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %config.listen_addr,
        backend = ?config.store.backend,
        "Starting kvgate"
    );

    let mut node = Node::new(config).await.context("creating node")?;
    node.start().await.context("starting node")?;

    shutdown_signal().await;

    info!("Received shutdown signal, gracefully shutting down...");
    node.shutdown().await.context("shutting down")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
