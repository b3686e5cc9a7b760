//! Status API subsystem.
//!
//! # Data Flow
//! ```text
//! GET / or /health
//!     → handlers.rs (snapshot the statistics store)
//!     → response.rs (StatusReport, pretty JSON)
//!
//! GET /ping
//!     → handlers.rs (spawn one round, answer immediately)
//!
//! anything else → empty 404
//! ```

pub mod handlers;
pub mod response;
pub mod server;

pub use response::{PingAck, StatusReport};
pub use server::{AppState, StatusServer};
