//! Probe rounds.
//!
//! A round probes every registered target concurrently, waits for all of
//! them, then records each outcome. Both the burst timer and the manual
//! trigger run rounds through [`RoundRunner`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::health::{Prober, StatsStore};
use crate::observability::metrics;
use crate::targets::TargetRegistry;

/// What started a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundTrigger {
    /// A tick of the burst timer.
    Burst,
    /// `GET /ping` on the status API.
    Manual,
}

impl RoundTrigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Burst => "burst",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for RoundTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Totals for one completed round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundSummary {
    pub round_id: Uuid,
    pub probed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

/// Something that can run one probe round.
///
/// The burst scheduler only depends on this, which keeps its timing
/// testable without network I/O.
pub trait RoundDriver: Send + Sync + 'static {
    fn run_round(&self, trigger: RoundTrigger) -> impl Future<Output = RoundSummary> + Send + '_;
}

/// Runs rounds against the registry and feeds the statistics store.
pub struct RoundRunner {
    registry: Arc<TargetRegistry>,
    prober: Prober,
    store: Arc<StatsStore>,
    shutdown: CancellationToken,
}

impl RoundRunner {
    pub fn new(
        registry: Arc<TargetRegistry>,
        prober: Prober,
        store: Arc<StatsStore>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            registry,
            prober,
            store,
            shutdown,
        }
    }

    pub fn registry(&self) -> &Arc<TargetRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<StatsStore> {
        &self.store
    }

    /// Probe every target once and record the outcomes.
    pub async fn run(&self, trigger: RoundTrigger) -> RoundSummary {
        let round_id = Uuid::new_v4();
        let started = Instant::now();
        tracing::debug!(
            round_id = %round_id,
            trigger = %trigger,
            targets = self.registry.len(),
            "Probe round starting"
        );

        let probes = self
            .registry
            .targets()
            .iter()
            .map(|target| self.prober.probe(target, &self.shutdown));
        let outcomes = join_all(probes).await;

        let mut summary = RoundSummary {
            round_id,
            probed: outcomes.len(),
            ..RoundSummary::default()
        };
        for outcome in &outcomes {
            metrics::record_probe(outcome);
            if let Err(e) = self.store.record_outcome(outcome) {
                tracing::warn!(round_id = %round_id, error = %e, "Dropping probe outcome");
                continue;
            }
            if outcome.status.is_success() {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
        }
        summary.elapsed = started.elapsed();
        metrics::record_round(trigger.as_str(), summary.elapsed);

        tracing::info!(
            round_id = %round_id,
            trigger = %trigger,
            succeeded = summary.succeeded,
            failed = summary.failed,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Probe round finished"
        );
        summary
    }

    /// Run a round in the background; the caller does not wait for it.
    pub fn spawn(self: &Arc<Self>, trigger: RoundTrigger) -> JoinHandle<RoundSummary> {
        let runner = Arc::clone(self);
        tokio::spawn(async move { runner.run(trigger).await })
    }
}

impl RoundDriver for RoundRunner {
    fn run_round(&self, trigger: RoundTrigger) -> impl Future<Output = RoundSummary> + Send + '_ {
        self.run(trigger)
    }
}
