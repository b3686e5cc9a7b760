//! Keep-alive monitor
//!
//! Keeps a fixed set of backends warm by probing them in bursts.
//!
//! # Architecture Overview
//!
//! ```text
//!     ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//!     │    cron      │────▶│    burst     │────▶│    round     │──── GET <base><ping_endpoint>
//!     │  schedule    │     │  scheduler   │     │   runner     │       to every target
//!     └──────────────┘     └──────────────┘     └──────┬───────┘
//!                                                      │ outcomes
//!     ┌──────────────┐     ┌──────────────┐     ┌──────▼───────┐
//!     │ status API   │────▶│  snapshot    │◀────│    stats     │
//!     │ / /health    │     │              │     │    store     │
//!     │ /ping ───────┼─────┼──────────────┼────▶│ (one round)  │
//!     └──────────────┘     └──────────────┘     └──────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use keepalive_monitor::config::{loader, ListenerConfig, ObservabilityConfig};
use keepalive_monitor::lifecycle::{startup, Shutdown};
use keepalive_monitor::observability::logging;

#[derive(Parser)]
#[command(name = "keepalive-monitor", version)]
#[command(about = "Keep backends warm with scheduled bursts of health probes", long_about = None)]
struct Cli {
    /// TOML configuration file; environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Status API port (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = loader::load_layered(cli.config.as_deref()).and_then(|mut config| {
        if let Some(port) = cli.port {
            config.listener = ListenerConfig::with_port(port);
        }
        loader::validated(config)
    });

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            let _ = logging::init(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    logging::init(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        targets = config.targets.backend_urls.len(),
        cron = %config.schedule.cron,
        interval_ms = config.schedule.ping_interval_ms,
        burst_ms = config.schedule.burst_duration_ms,
        bind_address = %config.listener.bind_address,
        "keepalive-monitor starting"
    );

    if let Err(e) = startup::run(config, Shutdown::new()).await {
        tracing::error!(error = %e, "Monitor failed");
        return Err(e.into());
    }
    Ok(())
}
