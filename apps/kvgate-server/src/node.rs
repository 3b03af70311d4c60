//! Server node composition.
//!
//! Builds the store client once, wires it into the router, and owns the
//! HTTP server's lifecycle.

use crate::config::{Backend, ServerConfig};
use crate::handlers::GatewayState;
use crate::http::{self, HttpServer, HttpServerError};
use kvgate_store::{EtcdStore, KvStore, MemoryStore, StoreError};
use std::net::SocketAddr;
use std::sync::Arc;

/// Gateway node - main composition root.
pub struct Node {
    /// Node configuration
    config: ServerConfig,

    /// Store handle shared by every request
    store: Arc<dyn KvStore>,

    /// HTTP server (created on start)
    http_server: Option<HttpServer>,
}

impl Node {
    /// Create a node, connecting to the configured backend.
    pub async fn new(config: ServerConfig) -> Result<Self, NodeError> {
        config
            .validate()
            .map_err(|e| NodeError::Initialization(e.to_string()))?;

        let store: Arc<dyn KvStore> = match config.store.backend {
            Backend::Etcd => Arc::new(EtcdStore::connect(&config.store.etcd()).await?),
            Backend::Memory => {
                tracing::warn!("Using in-memory store; data is lost on exit");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::with_store(config, store))
    }

    /// Create a node around an already-built store.
    pub fn with_store(config: ServerConfig, store: Arc<dyn KvStore>) -> Self {
        Self {
            config,
            store,
            http_server: None,
        }
    }

    /// Start serving HTTP. Returns the bound address.
    pub async fn start(&mut self) -> Result<SocketAddr, NodeError> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|e| NodeError::Initialization(e.to_string()))?;

        let app = http::router(GatewayState::new(self.store.clone()), self.config.cors.enabled);
        let mut server = HttpServer::new(addr, app);
        let bound = server.start().await?;

        tracing::info!(
            backend = self.store.backend_name(),
            cors = self.config.cors.enabled,
            "Gateway ready on {}",
            bound
        );

        self.http_server = Some(server);
        Ok(bound)
    }

    /// Bound HTTP address, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.http_server.as_ref().and_then(HttpServer::local_addr)
    }

    pub fn store(&self) -> Arc<dyn KvStore> {
        self.store.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(mut self) -> Result<(), NodeError> {
        if let Some(server) = self.http_server.take() {
            server.shutdown().await?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("HTTP server error: {0}")]
    Http(#[from] HttpServerError),
}
