//! Health probing subsystem.
//!
//! # Data Flow
//! ```text
//! Probe round (scheduler::round):
//!     → prober.rs (one GET per target, bounded by timeout)
//!     → outcome.rs (success / failed / error / timeout)
//!     → stats.rs (atomic per-target + global update)
//!
//! Status API:
//!     → stats.rs snapshot (read-consistent copy)
//! ```
//!
//! # Design Decisions
//! - The prober measures and classifies; it never touches the statistics
//! - The store is the single point of mutation
//! - Failed, error and timeout outcomes all count as failed pings

pub mod outcome;
pub mod prober;
pub mod stats;

pub use outcome::{ProbeOutcome, ProbeStatus};
pub use prober::Prober;
pub use stats::{GlobalStatistics, StatsError, StatsSnapshot, StatsStore, TargetStatistics};
