//! ROT13 API server.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                    ROT13 API                      │
//!                        │                                                   │
//!   Client Request       │  ┌───────────┐   ┌────────────┐   ┌───────────┐  │
//!   ─────────────────────┼─▶│ request id│──▶│ rate limit │──▶│   auth    │  │
//!                        │  │ + tracing │   │ (per IP)   │   │ (bearer)  │  │
//!                        │  └───────────┘   └────────────┘   └─────┬─────┘  │
//!                        │                                        ▼        │
//!   Client Response      │  ┌───────────┐   ┌────────────┐   ┌───────────┐  │
//!   ◀────────────────────┼──│   JSON    │◀──│   rot13    │◀──│ validate  │  │
//!                        │  └───────────┘   └────────────┘   └───────────┘  │
//!                        │                                                   │
//!                        │  config (TOML + env, hot reload) · observability  │
//!                        │  lifecycle (graceful shutdown)                    │
//!                        └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use rot13_api::config::{load_or_default, ConfigWatcher};
use rot13_api::observability::{logging, metrics};
use rot13_api::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "rot13-api")]
#[command(about = "ROT13 encoding service with JWT auth and rate limiting", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload the configuration file when it changes.
    #[arg(short, long, requires = "config")]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_or_default(args.config.as_deref())?;
    logging::init(&config.observability)?;

    tracing::info!("rot13-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        users = config.auth.users.len(),
        algorithm = %config.auth.algorithm,
        token_ttl_minutes = config.auth.access_token_expire_minutes,
        rate_limit_enabled = config.rate_limit.enabled,
        "Configuration loaded"
    );
    if config.uses_placeholder_secret() {
        tracing::warn!("auth.secret_key is the built-in placeholder; set ROT13_SECRET_KEY");
    }

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    // The watcher must outlive the server for reload events to keep coming.
    let (_watcher, config_updates) = match (&args.config, args.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::start(path)?;
            (Some(watcher), updates)
        }
        _ => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config);
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
