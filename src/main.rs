//! Backend-for-frontend gRPC proxy.
//!
//! Turns the web frontend's JSON requests into unary gRPC calls and relays
//! chat event streams.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                      BFF                          │
//!                         │                                                   │
//!     Client Request      │  ┌─────────┐    ┌──────────┐    ┌────────────┐   │
//!     ────────────────────┼─▶│  http   │───▶│ routing  │───▶│    rpc     │───┼──▶ gRPC
//!                         │  │ server  │    │ registry │    │ metadata + │   │    services
//!                         │  └────┬────┘    └──────────┘    │  invoke    │   │
//!                         │       │                         └─────┬──────┘   │
//!                         │       │                               ▼          │
//!     Client Response     │  ┌────┴─────┐                   ┌────────────┐   │
//!     ◀───────────────────┼──│ response │◀──────────────────│   status   │   │
//!                         │  │ envelope │                   │ translator │   │
//!                         │  └──────────┘                   └────────────┘   │
//!                         │                                                   │
//!     POST stream path ───┼──▶ http::stream ──────────────────────────────────┼──▶ chat backend
//!                         │                                                   │
//!                         │  config · security · observability · lifecycle    │
//!                         └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use trip_bff::config::loader::{default_config, load_config};
use trip_bff::lifecycle::{spawn_signal_handler, Shutdown};
use trip_bff::observability::{logging, metrics};
use trip_bff::{BffServer, Upstreams};

#[derive(Debug, Parser)]
#[command(name = "trip-bff", version, about = "Backend-for-frontend gRPC proxy")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => default_config()?,
    };

    logging::init_logging(&config.observability)?;

    tracing::info!("trip-bff v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        user_service = %config.upstreams.user.endpoint,
        attraction_service = %config.upstreams.attraction.endpoint,
        cookie_secure = config.session.secure,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    // Upstream channels connect on first use
    let upstreams = Upstreams::connect_lazy(&config.upstreams)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    spawn_signal_handler(shutdown.clone());

    let server = BffServer::new(config, upstreams)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
