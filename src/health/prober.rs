//! Active HTTP prober.
//!
//! # Responsibilities
//! - Issue one GET per call against a target's probe URL
//! - Enforce the per-request timeout by cancelling the probe's token
//! - Drain and discard the response body
//! - Classify the result without ever failing the caller

use std::time::{Duration, Instant};

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::ProbeConfig;
use crate::health::outcome::{ProbeOutcome, ProbeStatus};
use crate::targets::Target;

/// Why an in-flight probe was abandoned.
enum Abort {
    Timeout,
    Cancelled,
}

pub struct Prober {
    client: reqwest::Client,
    timeout: Duration,
}

impl Prober {
    pub fn new(config: &ProbeConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            timeout: config.timeout(),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe one target.
    ///
    /// The probe runs under a child of `cancel`: the timeout cancels the
    /// child, and cancelling the parent (shutdown) aborts the probe as well.
    /// Either way the request future is dropped, which closes its connection.
    ///
    /// The timeout covers the wait for response headers. The outcome is
    /// classified as soon as they arrive; the body is then drained within
    /// whatever is left of the timeout.
    pub async fn probe(&self, target: &Target, cancel: &CancellationToken) -> ProbeOutcome {
        let handle = cancel.child_token();
        let started = Instant::now();
        let request = self.client.get(target.probe_url().clone()).send();

        let result = tokio::select! {
            biased;
            _ = handle.cancelled() => Err(Abort::Cancelled),
            _ = time::sleep(self.timeout) => {
                handle.cancel();
                Err(Abort::Timeout)
            }
            result = request => Ok(result),
        };

        let mut body = None;
        let outcome = match result {
            Ok(Ok(response)) => {
                let outcome = ProbeOutcome::from_response(
                    target.id(),
                    response.status().as_u16(),
                    started.elapsed(),
                );
                body = Some(response);
                outcome
            }
            Ok(Err(e)) => ProbeOutcome::new(target.id(), ProbeStatus::Error, started.elapsed())
                .with_detail(e.to_string()),
            Err(Abort::Timeout) => {
                ProbeOutcome::new(target.id(), ProbeStatus::Timeout, started.elapsed())
                    .with_detail(format!("no response within {}ms", self.timeout.as_millis()))
            }
            Err(Abort::Cancelled) => {
                ProbeOutcome::new(target.id(), ProbeStatus::Error, started.elapsed())
                    .with_detail("cancelled")
            }
        };

        match outcome.status {
            ProbeStatus::Success => tracing::debug!(
                backend = %target,
                status = ?outcome.status_code,
                elapsed_ms = ?outcome.elapsed_ms,
                "Probe succeeded"
            ),
            ProbeStatus::Failed => tracing::warn!(
                backend = %target,
                status = ?outcome.status_code,
                elapsed_ms = ?outcome.elapsed_ms,
                "Probe failed: non-success status"
            ),
            ProbeStatus::Error => tracing::warn!(
                backend = %target,
                error = outcome.detail.as_deref().unwrap_or_default(),
                "Probe failed: connection error"
            ),
            ProbeStatus::Timeout => tracing::warn!(
                backend = %target,
                timeout_ms = self.timeout.as_millis() as u64,
                "Probe failed: timeout"
            ),
        }

        if let Some(response) = body {
            let budget = self.timeout.saturating_sub(started.elapsed());
            self.drain(target, response, budget, &handle).await;
        }

        outcome
    }

    /// Read and discard the body. The status is already known, so a broken
    /// or stalled body only ends the read; dropping the response closes it.
    async fn drain(
        &self,
        target: &Target,
        mut response: reqwest::Response,
        budget: Duration,
        handle: &CancellationToken,
    ) {
        let read_all = async {
            while let Ok(Some(_)) = response.chunk().await {}
        };

        tokio::select! {
            biased;
            _ = handle.cancelled() => {}
            _ = time::sleep(budget) => {
                tracing::debug!(backend = %target, "Response body not drained in time, closing connection");
            }
            _ = read_all => {}
        }
    }
}
