//! Puter relay server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client                 ┌──────────────────────────────────────────────┐
//!     POST /api/proxy        │                 PUTER RELAY                  │
//!     ?path=fs/readdir       │                                              │
//!     ──────────────────────▶│  http::server ──▶ routing ──▶ upstream       │──▶ Puter API
//!                            │   (verb, token)   (Route,     (bearer auth,  │    /readdir
//!                            │                   payload)     POST)         │    /read
//!     ◀──────────────────────│  http::response ◀──────────────────┘         │◀── /batch
//!     JSON or                │   (JSON passthrough /                        │    /drivers/call
//!     text/event-stream      │    streaming::reframe)                       │
//!                            │                                              │
//!                            │  config · observability · lifecycle          │
//!                            └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use puter_relay::config::{apply_env, load_config, validate_config, ConfigError, RelayConfig};
use puter_relay::http::HttpServer;
use puter_relay::lifecycle::shutdown_signal;
use puter_relay::observability::{init_logging, metrics};

#[derive(Parser)]
#[command(name = "puter-relay")]
#[command(about = "Single-endpoint relay for the Puter API", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };
    apply_env(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    init_logging(&config.observability.log_level);
    tracing::info!("puter-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        max_body_size = config.limits.max_body_size,
        credential_configured = config.upstream.credential().is_some(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(error = %e, "Failed to start metrics endpoint");
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
