//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Registry/Prober/Stats → Metrics → Bind → Scheduler → Serve
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Scheduler stops firing → Burst timer cancelled → Server drains → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::StartupError;
