//! Target registry subsystem.
//!
//! # Data Flow
//! ```text
//! TargetsConfig (base addresses + probe path)
//!     → target.rs (parse each address, build probe URL)
//!     → registry.rs (ordered, immutable list)
//!     → shared via Arc with the round runner and status API
//! ```
//!
//! # Design Decisions
//! - Identity is the configured base address, not the probe URL
//! - The list is fixed for the process lifetime
//! - An empty or unparsable list is a startup error

pub mod registry;
pub mod target;

pub use registry::TargetRegistry;
pub use target::{parse_base_url, RegistryError, Target};
