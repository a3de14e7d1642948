//! Agro Geospatial API server.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────────┐
//!                       │                  AGRO GEOSPATIAL API                   │
//!                       │                                                        │
//!     Client Request    │  ┌──────────┐   ┌──────────┐   ┌──────────────────┐   │
//!     ──────────────────┼─▶│ request  │──▶│ security │──▶│  rate limiter    │   │
//!                       │  │ id + log │   │ headers  │   │ (sliding window) │   │
//!                       │  └──────────┘   └──────────┘   └────────┬─────────┘   │
//!                       │                                         │ admitted     │
//!                       │                                         ▼              │
//!     Client Response   │                               ┌──────────────────┐    │
//!     ◀─────────────────┼───────────────────────────────│  api handlers    │    │
//!                       │                               │ vector / raster  │    │
//!                       │                               │ report / location│    │
//!                       │                               └──────────────────┘    │
//!                       │                                                        │
//!                       │  ┌──────────┐ ┌──────────────┐ ┌──────────────────┐   │
//!                       │  │  config  │ │observability │ │    lifecycle     │   │
//!                       │  └──────────┘ └──────────────┘ └──────────────────┘   │
//!                       └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;

use agro_geo_api::config::loader::{apply_env_overrides, load_config};
use agro_geo_api::config::validation::validate_config;
use agro_geo_api::config::{AppConfig, ConfigError};
use agro_geo_api::lifecycle::{signals, Shutdown};
use agro_geo_api::observability::{logging, metrics};
use agro_geo_api::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "agro-geo-api")]
#[command(about = "API for the Geospatial Agricultural Intelligence System", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(e) => {
            // Logging is not up yet; the config decides the level.
            eprintln!("fatal configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(&config.observability.log_level);

    tracing::info!("agro-geo-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        rate_limit_enabled = config.rate_limit.enabled,
        requests_limit = config.rate_limit.requests_limit,
        window_secs = config.rate_limit.window_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server terminated with error");
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(args: &Args) -> Result<AppConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config)?;

    if let Some(bind) = &args.bind {
        config.listener.bind_address = bind.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

async fn run(config: AppConfig) -> Result<(), std::io::Error> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        signals::wait_for_shutdown().await;
        shutdown.trigger();
    });

    HttpServer::new(config).run(listener, server_shutdown).await
}
