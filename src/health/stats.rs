//! Statistics store.
//!
//! # Responsibilities
//! - Hold per-target and aggregate probe counters
//! - Apply each probe outcome atomically to both
//! - Hand out consistent snapshots for reporting
//!
//! # Design Decisions
//! - One mutex guards every counter, so an outcome is never half-applied
//! - Critical sections are short and never await
//! - Entries are created once at startup and never removed

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use thiserror::Error;

use crate::health::outcome::{ProbeOutcome, ProbeStatus};
use crate::targets::TargetRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("outcome for unregistered target {0:?}")]
    UnknownTarget(String),
}

/// Running counters for one target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetStatistics {
    pub total_pings: u64,
    pub successful_pings: u64,
    pub failed_pings: u64,
    pub last_ping_time: Option<DateTime<Utc>>,
    pub last_ping_status: Option<ProbeStatus>,
    pub last_response_time: Option<u64>,
}

impl TargetStatistics {
    fn apply(&mut self, outcome: &ProbeOutcome) {
        self.total_pings += 1;
        if outcome.status.is_success() {
            self.successful_pings += 1;
        } else {
            self.failed_pings += 1;
        }
        self.last_ping_time = Some(outcome.completed_at);
        self.last_ping_status = Some(outcome.status);
        self.last_response_time = outcome.elapsed_ms;
    }
}

/// Counters summed over every target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStatistics {
    pub total_pings: u64,
    pub successful_pings: u64,
    pub failed_pings: u64,
}

impl GlobalStatistics {
    fn apply(&mut self, status: ProbeStatus) {
        self.total_pings += 1;
        if status.is_success() {
            self.successful_pings += 1;
        } else {
            self.failed_pings += 1;
        }
    }
}

/// Per-target statistics in registry order, serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetStatsMap(Vec<(String, TargetStatistics)>);

impl TargetStatsMap {
    pub fn get(&self, id: &str) -> Option<&TargetStatistics> {
        self.0.iter().find(|(key, _)| key == id).map(|(_, stats)| stats)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TargetStatistics)> {
        self.0.iter().map(|(key, stats)| (key.as_str(), stats))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for TargetStatsMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, stats) in &self.0 {
            map.serialize_entry(key, stats)?;
        }
        map.end()
    }
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub servers: TargetStatsMap,
    pub global_stats: GlobalStatistics,
    #[serde(rename = "startTime")]
    pub service_start_time: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct StatsInner {
    servers: Vec<(String, TargetStatistics)>,
    index: HashMap<String, usize>,
    global: GlobalStatistics,
}

/// Shared store for probe statistics.
#[derive(Debug)]
pub struct StatsStore {
    inner: Mutex<StatsInner>,
    started_at: DateTime<Utc>,
    started: Instant,
}

impl StatsStore {
    /// Create zeroed entries for each distinct identity, keeping order.
    pub fn new<I, S>(identities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut inner = StatsInner::default();
        for id in identities {
            let id = id.into();
            if inner.index.contains_key(&id) {
                continue;
            }
            inner.index.insert(id.clone(), inner.servers.len());
            inner.servers.push((id, TargetStatistics::default()));
        }

        Self {
            inner: Mutex::new(inner),
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    pub fn from_registry(registry: &TargetRegistry) -> Self {
        Self::new(registry.identities())
    }

    /// Apply one outcome to its target and to the global counters.
    pub fn record_outcome(&self, outcome: &ProbeOutcome) -> Result<(), StatsError> {
        let mut inner = self.lock();
        let slot = *inner
            .index
            .get(&outcome.target)
            .ok_or_else(|| StatsError::UnknownTarget(outcome.target.clone()))?;

        inner.servers[slot].1.apply(outcome);
        inner.global.apply(outcome.status);
        Ok(())
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = self.lock();
        StatsSnapshot {
            servers: TargetStatsMap(inner.servers.clone()),
            global_stats: inner.global,
            service_start_time: self.started_at,
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    fn lock(&self) -> MutexGuard<'_, StatsInner> {
        // Updates cannot leave the counters half-written, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
