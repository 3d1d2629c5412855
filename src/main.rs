//! DTPS announce relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌──────────────────────────────────────────────────────┐
//!                   │                     ANNOUNCE RELAY                    │
//!   POST /announce* │  ┌────────┐   ┌───────────┐   ┌──────────────────┐   │
//!   ────────────────┼─▶│  http  │──▶│   relay   │──▶│ ledger::legacy   │───┼──▶ legacy node
//!                   │  │ + auth │   │ pipeline  │   │  (node selector) │   │    (PUT /transactions)
//!                   │  └────────┘   └─────┬─────┘   └──────────────────┘   │
//!                   │                     │         ┌──────────────────┐   │
//!                   │                     ├────────▶│ ledger::cosmos   │───┼──▶ Tendermint RPC
//!                   │                     │         └──────────────────┘   │
//!                   │                     ▼                                │
//!                   │               ┌───────────┐                          │
//!                   │               │   store   │ entities, configs        │
//!                   │               └───────────┘                          │
//!                   │  config · observability · lifecycle                  │
//!                   └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use dtps_relay::config::{load_config, RelayConfig};
use dtps_relay::lifecycle::signals::spawn_signal_handler;
use dtps_relay::lifecycle::{build_application, Shutdown};
use dtps_relay::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "dtps-relay", version, about = "DTPS announce relay")]
struct Args {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "DTPS_RELAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "dtps-relay starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        directory = %config.legacy.directory_url,
        rpc = %config.cosmos.rpc_url,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let app = build_application(config)?;

    let shutdown = Arc::new(Shutdown::new());
    spawn_signal_handler(shutdown.clone());

    app.server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
