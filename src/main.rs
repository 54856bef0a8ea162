//! CIS pull gateway.
//!
//! Accepts JSON subscription lookups over REST and forwards each one as a
//! single SOAP call to the CIS web service.
//!
//! # Architecture Overview
//!
//! ```text
//!     REST caller                                                   CIS SOAP
//!     ───────────┐                                                  endpoint
//!                ▼                                                     ▲
//!     ┌──────────────────┐   ┌────────────────┐   ┌────────────────┐   │
//!     │ http             │──▶│ cis            │──▶│ soap           │   │
//!     │ axum + tower-http│   │ CisPullService │   │ SoapClient     │   │
//!     └──────────────────┘   └────────────────┘   │ + interceptors │   │
//!                ▲                   │            └───────┬────────┘   │
//!                │   CallOutcome     │                    ▼            │
//!                └───────────────────┘            ┌────────────────┐   │
//!                                                 │ transport      │───┘
//!                                                 │ reqwest + probe│
//!                                                 └────────────────┘
//!
//!     Cross-cutting: config, observability (tracing, metrics), lifecycle
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use cis_gateway::config::validation::validate_config;
use cis_gateway::config::{load_config, ConfigError, GatewayConfig};
use cis_gateway::http::HttpServer;
use cis_gateway::lifecycle::{signals, Shutdown};
use cis_gateway::observability::{init_logging, metrics};

#[derive(Parser)]
#[command(name = "cis-gateway")]
#[command(version, about = "REST to SOAP gateway for CIS subscription lookups", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults are used when omitted
    #[arg(short, long, env = "CIS_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override `webservice.url`
    #[arg(long, env = "WEBSERVICE_CIS_URL")]
    webservice_url: Option<String>,

    /// Override `listener.bind_address`
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(url) = cli.webservice_url {
        config.webservice.url = url;
    }
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    init_logging(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "cis-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        endpoint = %config.webservice.url,
        connect_timeout_secs = config.webservice.connect_timeout_secs,
        read_timeout_secs = config.webservice.read_timeout_secs,
        request_timeout_secs = config.timeouts.request_secs,
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
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
