//! Games API server.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                  GAMES API                    │
//!   Client Request        │  ┌──────────┐    ┌────────────────────────┐  │
//!   ──────────────────────┼─▶│  http    │───▶│ /api/games  (games)    │──┼──▶ PostgREST store
//!                         │  │  server  │    └────────────────────────┘  │
//!                         │  │          │    ┌────────────────────────┐  │
//!   Client Response       │  │          │───▶│ /api/proxy-image       │──┼──▶ Image origin
//!   ◀─────────────────────┼──│          │◀───│ (relay, streamed)      │◀─┼─── (http / https)
//!                         │  └──────────┘    └────────────────────────┘  │
//!                         │                                              │
//!                         │  config · observability · lifecycle          │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use games_api::config::{load_config, ObservabilityConfig};
use games_api::lifecycle::{self, Shutdown};
use games_api::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "games-api")]
#[command(about = "REST API for the games catalog", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logging::init_logging(&ObservabilityConfig::default());
            tracing::error!(
                error = %e,
                "Invalid configuration; set SUPABASE_URL and SUPABASE_KEY \
                 (Dashboard > Settings > API)"
            );
            return Err(e.into());
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "games-api starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        store_table = %config.store.table,
        relay_timeout_secs = config.relay.upstream_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        lifecycle::shutdown_signal().await;
        shutdown.trigger();
    });

    lifecycle::start(config, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
