//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults or config file (TOML)
//!     → loader.rs (parse, overlay .env and environment variables)
//!     → CLI overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → MonitorConfig (validated, immutable)
//!     → handed to startup, which builds every subsystem from it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the target list never changes at runtime
//! - All fields have defaults except the target list
//! - Validation separates syntactic (serde) from semantic checks
//! - Any validation error is fatal before a single timer starts

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::{
    ListenerConfig, LogFormat, MonitorConfig, ObservabilityConfig, OverlapPolicy, ProbeConfig,
    ScheduleConfig, TargetsConfig,
};
