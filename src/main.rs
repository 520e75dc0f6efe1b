//! route-guard demo server.
//!
//! Serves a catch-all echo endpoint behind the configured authorization
//! policy.
//!
//! ```text
//! route-guard --config guard.toml
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use route_guard::config::{load_config, GuardConfig};
use route_guard::observability::{logging, metrics};
use route_guard::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "route-guard")]
#[command(about = "HTTP server guarded by a path/method authorization policy", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults (no rules) when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GuardConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!("route-guard v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        rules = config.rules.len(),
        principals = config.principals.len(),
        mode = %config.authz.mode,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(shutdown.trigger_on_ctrl_c());

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
