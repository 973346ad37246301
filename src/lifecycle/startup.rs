//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the store client and the HTTP server from validated config
//! - Bind the listener last, so traffic only arrives once everything is ready
//! - Serve until the shutdown broadcast fires

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::games::{GameStore, RestStore, StoreError};
use crate::http::HttpServer;
use crate::relay::RelayError;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("games store: {0}")]
    Store(#[from] StoreError),

    #[error("image relay: {0}")]
    Relay(#[from] RelayError),

    #[error("listener: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the service and run it until `shutdown` fires.
pub async fn start(
    config: AppConfig,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), StartupError> {
    let store: Arc<dyn GameStore> = Arc::new(RestStore::new(&config.store)?);
    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config, store)?;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    server.run(listener, shutdown).await?;
    Ok(())
}
