//! Status API response bodies.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::health::StatsSnapshot;

/// Body of `GET /` and `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub status: &'static str,
    /// Number of configured targets.
    pub servers: usize,
    pub stats: StatsSnapshot,
    /// Whole seconds since start, e.g. `"42s"`.
    pub uptime: String,
}

impl StatusReport {
    pub fn new(servers: usize, stats: StatsSnapshot, uptime_secs: u64) -> Self {
        Self {
            status: "running",
            servers,
            stats,
            uptime: format!("{uptime_secs}s"),
        }
    }
}

/// Body of `GET /ping`.
#[derive(Debug, Clone, Serialize)]
pub struct PingAck {
    pub message: &'static str,
}

impl Default for PingAck {
    fn default() -> Self {
        Self {
            message: "Manual ping triggered",
        }
    }
}

/// Render `body` as indented JSON.
pub fn pretty_json<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_string_pretty(body) {
        Ok(json) => (status, [(header::CONTENT_TYPE, "application/json")], json).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response body");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
