//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the monitor.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the keep-alive monitor.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Backends to keep awake and the path probed on each.
    pub targets: TargetsConfig,

    /// Outer cron schedule and burst timing.
    pub schedule: ScheduleConfig,

    /// Per-probe HTTP settings.
    pub probe: ProbeConfig,

    /// Status API listener.
    pub listener: ListenerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Target list configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetsConfig {
    /// Base addresses of the backends (e.g., "https://api.example.com").
    pub backend_urls: Vec<String>,

    /// Path appended to every base address to form the probe URL.
    pub ping_endpoint: String,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            backend_urls: Vec::new(),
            ping_endpoint: "/api/health".to_string(),
        }
    }
}

/// Scheduling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Outer schedule in cron syntax (5 fields, or 6 with leading seconds).
    pub cron: String,

    /// Delay between probe rounds inside a burst, in milliseconds.
    pub ping_interval_ms: u64,

    /// Length of a burst window, in milliseconds.
    pub burst_duration_ms: u64,

    /// What to do when the schedule fires while a burst is still running.
    pub overlap_policy: OverlapPolicy,
}

impl ScheduleConfig {
    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval_ms)
    }

    pub fn burst_duration(&self) -> Duration {
        Duration::from_millis(self.burst_duration_ms)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron: "* * * * *".to_string(),
            ping_interval_ms: 10_000,
            burst_duration_ms: 60_000,
            overlap_policy: OverlapPolicy::Skip,
        }
    }
}

/// Re-trigger policy for a schedule firing that lands inside a running burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Ignore the firing; the running burst keeps its window.
    #[default]
    Skip,
    /// Cancel the running burst timer and open a fresh window.
    Restart,
}

impl FromStr for OverlapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "restart" => Ok(Self::Restart),
            other => Err(format!("unknown overlap policy {other:?} (expected skip or restart)")),
        }
    }
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => f.write_str("skip"),
            Self::Restart => f.write_str("restart"),
        }
    }
}

/// Probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,

    /// User-Agent header sent with every probe.
    pub user_agent: String,
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 7_000,
            user_agent: concat!("keepalive-monitor/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3001").
    pub bind_address: String,
}

impl ListenerConfig {
    /// Bind on all interfaces at the given port.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_address: format!("0.0.0.0:{port}"),
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self::with_port(3001)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format {other:?} (expected pretty or json)")),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter when `RUST_LOG` is unset (trace, debug, info, warn, error).
    pub log_level: String,

    /// Pretty output for terminals, JSON for log shippers.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
