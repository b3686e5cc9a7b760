//! Probe outcome classification.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a single probe ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// Response with a 2xx status code.
    Success,
    /// Response with any other status code.
    Failed,
    /// Transport-level failure (refused, DNS, reset).
    Error,
    /// No response within the request timeout.
    Timeout,
}

impl ProbeStatus {
    /// Classify a received HTTP status code.
    pub fn from_status_code(code: u16) -> Self {
        if (200..300).contains(&code) {
            Self::Success
        } else {
            Self::Failed
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Error => "error",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one probe attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// Identity of the probed target.
    pub target: String,
    pub status: ProbeStatus,
    /// Time from request issue to response headers, failure, or timeout.
    pub elapsed_ms: Option<u64>,
    pub completed_at: DateTime<Utc>,
    /// Status code, when a response was received.
    pub status_code: Option<u16>,
    /// Short description for error and timeout outcomes.
    pub detail: Option<String>,
}

impl ProbeOutcome {
    pub fn new(target: impl Into<String>, status: ProbeStatus, elapsed: Duration) -> Self {
        Self {
            target: target.into(),
            status,
            elapsed_ms: Some(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)),
            completed_at: Utc::now(),
            status_code: None,
            detail: None,
        }
    }

    /// Outcome for a received response, classified by its status code.
    pub fn from_response(target: impl Into<String>, code: u16, elapsed: Duration) -> Self {
        let mut outcome = Self::new(target, ProbeStatus::from_status_code(code), elapsed);
        outcome.status_code = Some(code);
        outcome
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
