//! Tools API gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────────┐
//!                  │                    TOOLS GATEWAY                      │
//!                  │                                                       │
//!  Client Request  │  ┌──────────┐   ┌──────────┐   ┌──────────────────┐  │
//!  ────────────────┼─▶│ request  │──▶│   CORS   │──▶│ failure boundary │  │
//!                  │  │ id/trace │   │  policy  │   │ panic/err/timeout│  │
//!                  │  └──────────┘   └──────────┘   └────────┬─────────┘  │
//!                  │                                         │            │
//!                  │              ┌──────────────────────────┤            │
//!                  │              ▼                          ▼            │
//!                  │     ┌────────────────┐        ┌─────────────────┐   │
//!                  │     │ GET / , /health│        │ route table     │   │
//!                  │     │ (gateway)      │        │ longest prefix  │   │
//!                  │     └────────────────┘        └───────┬─────────┘   │
//!                  │                                       │             │
//!                  │                  ┌────────────┬───────┴─────┐       │
//!                  │                  ▼            ▼             ▼       │
//!                  │            DataShark  QueryHammerhead    VizFin     │
//!                  └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use tools_gateway::config::validation::validate_config;
use tools_gateway::config::{load_config, ConfigError, GatewayConfig};
use tools_gateway::observability::{logging, metrics};
use tools_gateway::{GatewayServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "tools-gateway")]
#[command(version, about = "HTTP gateway for the DataShark, QueryHammerhead and VizFin tool APIs")]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Host to bind, overriding the config file.
    #[arg(long, env = "GATEWAY_HOST")]
    host: Option<String>,

    /// Port to bind, overriding the config file.
    #[arg(long, env = "GATEWAY_PORT")]
    port: Option<u16>,

    /// Log at debug level.
    #[arg(long, env = "GATEWAY_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(host) = args.host {
        config.listener.host = host;
    }
    if let Some(port) = args.port {
        config.listener.port = port;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability, args.debug);

    tracing::info!("tools-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        request_timeout_secs = config.timeouts.request_secs,
        allowed_origins = ?config.cors.allowed_origins,
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

    // Routes are fixed before the listener exists.
    let server = GatewayServer::new(config.clone())?;

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();
    server.run(listener, shutdown.signalled()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
