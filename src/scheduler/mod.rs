//! Scheduling subsystem.
//!
//! # Data Flow
//! ```text
//! cron.rs (outer schedule, e.g. every minute)
//!     → burst.rs (Idle → BurstRunning, repeating timer at the sub-interval)
//!     → round.rs (one round per tick: probe all targets, record outcomes)
//!     → after the burst duration: BurstRunning → Idle
//!
//! Manual trigger (status API):
//!     → round.rs directly, no effect on the burst state
//! ```
//!
//! # Design Decisions
//! - Re-firing while a burst runs follows an explicit overlap policy
//! - Burst exit cancels the timer but never in-flight rounds
//! - The scheduler sees rounds only through the `RoundDriver` trait

pub mod burst;
pub mod cron;
pub mod round;

pub use burst::{BurstScheduler, BurstSettings, BurstState, TriggerOutcome};
pub use cron::{CronError, CronSchedule};
pub use round::{RoundDriver, RoundRunner, RoundSummary, RoundTrigger};
