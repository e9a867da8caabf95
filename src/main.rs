//! Serverless HTTP gateway (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                   GATEWAY                    │
//!     Client Request      │  ┌────────┐   ┌──────────┐   ┌───────────┐   │
//!     ────────────────────┼─▶│  http  │──▶│ dispatch │──▶│  routing  │◀──┼──── Object store
//!                         │  │ server │   │          │   │   table   │   │     (routing doc)
//!                         │  └────────┘   └────┬─────┘   └───────────┘   │
//!                         │                    │                         │
//!                         │                    ▼                         │
//!     Client Response     │               ┌──────────┐   ┌───────────┐   │
//!     ◀───────────────────┼───────────────│  event   │◀─▶│  backend  │◀──┼──── Function
//!                         │               │translator│   │  invoker  │   │     service
//!                         │               └──────────┘   └───────────┘   │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use qi_gateway::config::{load_config, validate_config, GatewayConfig};
use qi_gateway::lifecycle::{signals, Shutdown};
use qi_gateway::observability::{logging, metrics};
use qi_gateway::{Dispatcher, HttpServer};

#[derive(Parser)]
#[command(name = "qi-gateway")]
#[command(about = "HTTP gateway dispatching requests to serverless functions", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override routes.path.
    #[arg(long)]
    routes_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(routes_path) = cli.routes_path {
        config.routes.path = routes_path;
    }
    if let Err(errors) = validate_config(&config) {
        for e in &errors {
            eprintln!("Invalid configuration: {}", e);
        }
        return Err("configuration rejected".into());
    }

    logging::init_logging(&config.observability);
    tracing::info!("qi-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes_path = %config.routes.path,
        invoker = %config.invoker.base_url(),
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

    let dispatcher = Dispatcher::from_config(&config)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    HttpServer::new(dispatcher)
        .run(listener, server_shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
