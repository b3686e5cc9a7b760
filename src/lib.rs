//! Keep-alive monitor library.
//!
//! Periodically probes a fixed set of backends in bursts driven by a cron
//! schedule, keeps per-target statistics and serves them over HTTP.

// Core subsystems
pub mod config;
pub mod health;
pub mod http;
pub mod scheduler;
pub mod targets;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::MonitorConfig;
pub use health::{Prober, StatsStore};
pub use http::StatusServer;
pub use lifecycle::Shutdown;
pub use scheduler::{BurstScheduler, CronSchedule, RoundRunner};
pub use targets::TargetRegistry;
