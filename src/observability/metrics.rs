//! Metrics collection and exposition.
//!
//! # Metrics
//! - `keepalive_probes_total` (counter): probes by target and status
//! - `keepalive_probe_duration_seconds` (histogram): probe latency by target
//! - `keepalive_rounds_total` (counter): probe rounds by trigger
//! - `keepalive_round_duration_seconds` (histogram): wall time of a round
//! - `keepalive_burst_active` (gauge): 1 while a burst window is open
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::health::ProbeOutcome;

/// Install the Prometheus recorder and its HTTP scrape listener.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_probe(outcome: &ProbeOutcome) {
    counter!(
        "keepalive_probes_total",
        "target" => outcome.target.clone(),
        "status" => outcome.status.as_str()
    )
    .increment(1);

    if let Some(ms) = outcome.elapsed_ms {
        histogram!("keepalive_probe_duration_seconds", "target" => outcome.target.clone())
            .record(ms as f64 / 1000.0);
    }
}

pub fn record_round(trigger: &'static str, elapsed: Duration) {
    counter!("keepalive_rounds_total", "trigger" => trigger).increment(1);
    histogram!("keepalive_round_duration_seconds", "trigger" => trigger)
        .record(elapsed.as_secs_f64());
}

pub fn set_burst_active(active: bool) {
    gauge!("keepalive_burst_active").set(if active { 1.0 } else { 0.0 });
}
