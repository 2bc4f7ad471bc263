//! API Server
//!
//! Hosts the REST router with graceful shutdown.

use crate::directory::Directory;
use crate::error::{Error, Result};
use std::net::SocketAddr;
use tokio::sync::broadcast;
use tracing::info;

use super::rest::RestRouter;

// =============================================================================
// Server Configuration
// =============================================================================

/// Configuration for the API server
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// REST API bind address
    pub rest_addr: SocketAddr,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            rest_addr: SocketAddr::from(([0, 0, 0, 0], 50040)),
        }
    }
}

impl ApiServerConfig {
    /// Parse a `host:port` bind address
    pub fn from_bind_addr(addr: &str) -> Result<Self> {
        let rest_addr = addr
            .parse()
            .map_err(|e| Error::Configuration(format!("invalid API address {}: {}", addr, e)))?;
        Ok(Self { rest_addr })
    }
}

// =============================================================================
// API Server
// =============================================================================

/// REST API server
pub struct ApiServer {
    config: ApiServerConfig,
    directory: Directory,
    shutdown_tx: broadcast::Sender<()>,
}

impl ApiServer {
    pub fn new(config: ApiServerConfig, directory: Directory) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            directory,
            shutdown_tx,
        }
    }

    /// Serve until [`shutdown`](Self::shutdown) is called
    pub async fn run(&self) -> Result<()> {
        let addr = self.config.rest_addr;
        let app = RestRouter::new(self.directory.clone()).build();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Internal(format!("Failed to bind REST server: {}", e)))?;
        info!("REST API listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("REST server shutting down");
            })
            .await
            .map_err(|e| Error::Internal(format!("REST server error: {}", e)))?;

        Ok(())
    }

    /// Trigger graceful shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}
