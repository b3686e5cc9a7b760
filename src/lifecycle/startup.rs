//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the registry, prober and statistics store from a validated config
//! - Start the metrics exporter when enabled
//! - Bind the status listener, then start the burst scheduler
//! - Serve until shutdown, then stop the scheduler
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and no timer is started
//! - Subsystems initialize in order, not concurrently
//! - The listener binds before the scheduler starts its first wait

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::MonitorConfig;
use crate::health::{Prober, StatsStore};
use crate::http::StatusServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals;
use crate::observability::metrics;
use crate::scheduler::{BurstScheduler, BurstSettings, CronError, CronSchedule, RoundRunner};
use crate::targets::{RegistryError, TargetRegistry};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("target registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("cron schedule: {0}")]
    Cron(#[from] CronError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("failed to install metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("status server: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the monitor until `shutdown` is triggered.
///
/// Installs the signal handler, so SIGINT/SIGTERM end the run.
pub async fn run(config: MonitorConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    let registry = Arc::new(TargetRegistry::from_config(&config.targets)?);
    let schedule: CronSchedule = config.schedule.cron.parse()?;
    let prober = Prober::new(&config.probe)?;
    let store = Arc::new(StatsStore::from_registry(&registry));

    tracing::info!(
        targets = registry.len(),
        ping_endpoint = %registry.ping_endpoint(),
        timeout_ms = prober.timeout().as_millis() as u64,
        "Target registry ready"
    );
    for target in registry.targets() {
        tracing::info!(
            backend = %target,
            probe_url = %target.probe_url(),
            tls = target.is_secure(),
            "Monitoring target"
        );
    }

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let runner = Arc::new(RoundRunner::new(
        Arc::clone(&registry),
        prober,
        Arc::clone(&store),
        shutdown.subscribe(),
    ));

    let address = config.listener.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    signals::spawn_signal_handler(shutdown.clone());

    let scheduler = Arc::new(BurstScheduler::new(
        Arc::clone(&runner),
        BurstSettings::from(&config.schedule),
        shutdown.subscribe(),
    ));
    let scheduler_task = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move { scheduler.run(&schedule).await })
    };

    let served = StatusServer::new(runner)
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve);

    if !shutdown.is_triggered() {
        tracing::warn!("Status server stopped before shutdown was requested");
    }
    // Server errors end the run as well.
    shutdown.trigger();
    scheduler.stop();
    if let Err(e) = scheduler_task.await {
        tracing::warn!(error = %e, "Scheduler task ended abnormally");
    }

    tracing::info!("Shutdown complete");
    served
}
