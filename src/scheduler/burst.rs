//! Burst scheduler state machine.
//!
//! # States
//! - Idle: initial state, and the resting state between schedule firings
//! - BurstRunning: a repeating timer spawns one probe round per tick
//!
//! # State Transitions
//! ```text
//! Idle → BurstRunning: schedule fires (start timer, first tick after one interval)
//! BurstRunning → Idle: burst duration elapsed (cancel timer, leave rounds in flight)
//! BurstRunning + fire: skip → ignored
//!                      restart → cancel timer, open a fresh window
//! ```
//!
//! # Design Decisions
//! - Rounds are spawned, so a slow round never delays the next tick
//! - When a tick and the deadline coincide, the deadline wins
//! - Expiry is decided from the deadline stored in the slot, so a firing that
//!   lands on the previous burst's deadline always starts a new burst
//! - A generation counter keeps a cancelled burst from clearing its successor

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::{OverlapPolicy, ScheduleConfig};
use crate::observability::metrics;
use crate::scheduler::cron::CronSchedule;
use crate::scheduler::round::{RoundDriver, RoundTrigger};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstState {
    Idle,
    BurstRunning,
}

/// Result of a schedule firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A new burst started from Idle.
    Started,
    /// A burst was already running and the policy is `skip`.
    Ignored,
    /// The running burst was cancelled and a fresh one started.
    Restarted,
}

/// Timing for a single burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstSettings {
    pub interval: Duration,
    pub duration: Duration,
    pub overlap: OverlapPolicy,
}

impl From<&ScheduleConfig> for BurstSettings {
    fn from(config: &ScheduleConfig) -> Self {
        Self {
            interval: config.ping_interval(),
            duration: config.burst_duration(),
            overlap: config.overlap_policy,
        }
    }
}

/// Firings this close to the running burst's deadline count as after it.
const EXPIRY_SLACK: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct ActiveBurst {
    timer: CancellationToken,
    deadline: Instant,
}

#[derive(Debug, Default)]
struct BurstSlot {
    /// Bursts started so far.
    generation: u64,
    /// The running burst; `None` while idle.
    active: Option<ActiveBurst>,
}

impl BurstSlot {
    /// The running burst, unless its window is over or about to be.
    fn running(&self, slack: Duration) -> Option<&ActiveBurst> {
        self.active
            .as_ref()
            .filter(|burst| Instant::now() + slack < burst.deadline)
    }
}

pub struct BurstScheduler<D> {
    driver: Arc<D>,
    settings: BurstSettings,
    slot: Arc<Mutex<BurstSlot>>,
    shutdown: CancellationToken,
}

impl<D: RoundDriver> BurstScheduler<D> {
    pub fn new(driver: Arc<D>, settings: BurstSettings, shutdown: CancellationToken) -> Self {
        Self {
            driver,
            settings,
            slot: Arc::new(Mutex::new(BurstSlot::default())),
            shutdown,
        }
    }

    pub fn state(&self) -> BurstState {
        if lock(&self.slot).running(Duration::ZERO).is_some() {
            BurstState::BurstRunning
        } else {
            BurstState::Idle
        }
    }

    /// Handle one firing of the outer schedule.
    pub fn trigger(&self) -> TriggerOutcome {
        let mut slot = lock(&self.slot);
        let slack = self.settings.interval.min(EXPIRY_SLACK);

        let outcome = match (slot.running(slack), self.settings.overlap) {
            (Some(_), OverlapPolicy::Skip) => {
                tracing::info!("Burst already running, ignoring schedule firing");
                return TriggerOutcome::Ignored;
            }
            (Some(_), OverlapPolicy::Restart) => {
                tracing::info!("Burst already running, restarting burst window");
                TriggerOutcome::Restarted
            }
            (None, _) => TriggerOutcome::Started,
        };

        // Ends the previous burst whether it was running or just expired.
        if let Some(previous) = slot.active.take() {
            previous.timer.cancel();
        }

        slot.generation += 1;
        let timer = self.shutdown.child_token();
        let started = Instant::now();
        slot.active = Some(ActiveBurst {
            timer: timer.clone(),
            deadline: started + self.settings.duration,
        });
        let generation = slot.generation;
        drop(slot);

        metrics::set_burst_active(true);
        tokio::spawn(run_burst(
            Arc::clone(&self.driver),
            self.settings,
            started,
            timer,
            Arc::clone(&self.slot),
            generation,
        ));
        outcome
    }

    /// Number of bursts started since creation.
    pub fn bursts_started(&self) -> u64 {
        lock(&self.slot).generation
    }

    /// Drive the outer schedule until shutdown.
    pub async fn run(&self, schedule: &CronSchedule) {
        tracing::info!(
            schedule = %schedule,
            interval_ms = self.settings.interval.as_millis() as u64,
            duration_ms = self.settings.duration.as_millis() as u64,
            overlap = %self.settings.overlap,
            "Burst scheduler starting"
        );

        let mut last_fired: Option<DateTime<Local>> = None;
        loop {
            let now = Local::now();
            let from = match last_fired {
                Some(last) if last > now => last,
                _ => now,
            };
            let Some(next) = schedule.next_after(&from) else {
                tracing::warn!(schedule = %schedule, "Schedule has no upcoming firings");
                break;
            };
            let wait = (next - now).to_std().unwrap_or_default();
            tracing::debug!(next = %next, "Waiting for next schedule firing");

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = time::sleep(wait) => {
                    tracing::info!(fired_at = %next, "Schedule fired, starting high-frequency pings");
                    self.trigger();
                    last_fired = Some(next);
                }
            }
        }

        self.stop();
        tracing::info!("Burst scheduler stopped");
    }

    /// Cancel the running burst timer, if any. In-flight rounds still finish.
    pub fn stop(&self) {
        let mut slot = lock(&self.slot);
        if let Some(burst) = slot.active.take() {
            burst.timer.cancel();
            metrics::set_burst_active(false);
        }
    }
}

async fn run_burst<D: RoundDriver>(
    driver: Arc<D>,
    settings: BurstSettings,
    started: Instant,
    timer: CancellationToken,
    slot: Arc<Mutex<BurstSlot>>,
    generation: u64,
) {
    let mut ticker = time::interval_at(started + settings.interval, settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let deadline = time::sleep_until(started + settings.duration);
    tokio::pin!(deadline);

    let mut rounds = 0u32;
    loop {
        tokio::select! {
            biased;
            _ = timer.cancelled() => break,
            _ = &mut deadline => break,
            _ = ticker.tick() => {
                rounds += 1;
                let driver = Arc::clone(&driver);
                tokio::spawn(async move {
                    driver.run_round(RoundTrigger::Burst).await;
                });
            }
        }
    }

    let mut slot = lock(&slot);
    if slot.generation == generation && slot.active.is_some() {
        slot.active = None;
        metrics::set_burst_active(false);
    }
    drop(slot);

    tracing::info!(
        rounds,
        elapsed_ms = started.elapsed().as_millis() as u64,
        cancelled = timer.is_cancelled(),
        "Ping cycle finished"
    );
}

fn lock(slot: &Mutex<BurstSlot>) -> MutexGuard<'_, BurstSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::round::RoundSummary;
    use chrono::TimeDelta;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingDriver {
        rounds: AtomicUsize,
    }

    impl RoundDriver for CountingDriver {
        fn run_round(
            &self,
            _trigger: RoundTrigger,
        ) -> impl Future<Output = RoundSummary> + Send + '_ {
            self.rounds.fetch_add(1, Ordering::SeqCst);
            std::future::ready(RoundSummary::default())
        }
    }

    fn scheduler(overlap: OverlapPolicy) -> (Arc<CountingDriver>, BurstScheduler<CountingDriver>) {
        let driver = Arc::new(CountingDriver::default());
        let settings = BurstSettings {
            interval: Duration::from_secs(10),
            duration: Duration::from_secs(60),
            overlap,
        };
        let scheduler = BurstScheduler::new(Arc::clone(&driver), settings, CancellationToken::new());
        (driver, scheduler)
    }

    fn rounds(driver: &CountingDriver) -> usize {
        driver.rounds.load(Ordering::SeqCst)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_runs_rounds_then_returns_to_idle() {
        let (driver, scheduler) = scheduler(OverlapPolicy::Skip);
        assert_eq!(scheduler.state(), BurstState::Idle);

        assert_eq!(scheduler.trigger(), TriggerOutcome::Started);
        assert_eq!(scheduler.state(), BurstState::BurstRunning);

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(rounds(&driver), 0, "first tick comes one interval after entry");

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(rounds(&driver), 1);

        time::sleep(Duration::from_secs(50)).await;
        assert_eq!(rounds(&driver), 5, "ticks at 10..50s; the deadline beats the 60s tick");
        assert_eq!(scheduler.state(), BurstState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn skip_policy_ignores_retrigger() {
        let (driver, scheduler) = scheduler(OverlapPolicy::Skip);

        scheduler.trigger();
        time::sleep(Duration::from_secs(15)).await;
        assert_eq!(scheduler.trigger(), TriggerOutcome::Ignored);

        time::sleep(Duration::from_secs(50)).await;
        assert_eq!(rounds(&driver), 5);
        assert_eq!(scheduler.state(), BurstState::Idle);

        assert_eq!(scheduler.trigger(), TriggerOutcome::Started);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_policy_opens_a_fresh_window() {
        let (driver, scheduler) = scheduler(OverlapPolicy::Restart);

        scheduler.trigger();
        time::sleep(Duration::from_secs(15)).await;
        assert_eq!(rounds(&driver), 1);
        assert_eq!(scheduler.trigger(), TriggerOutcome::Restarted);

        // Old burst would have ended at 60s; the new one runs until 75s.
        time::sleep(Duration::from_secs(50)).await;
        assert_eq!(scheduler.state(), BurstState::BurstRunning);

        time::sleep(Duration::from_secs(15)).await;
        assert_eq!(rounds(&driver), 6, "one round from the first window, five from the second");
        assert_eq!(scheduler.state(), BurstState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn firing_on_the_deadline_starts_a_new_burst() {
        let (driver, scheduler) = scheduler(OverlapPolicy::Skip);

        assert_eq!(scheduler.trigger(), TriggerOutcome::Started);
        // Same instant as the first burst's deadline, like `* * * * *` with a 60s burst.
        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(scheduler.trigger(), TriggerOutcome::Started);
        assert_eq!(scheduler.state(), BurstState::BurstRunning);
        assert_eq!(scheduler.bursts_started(), 2);

        time::sleep(Duration::from_secs(61)).await;
        assert_eq!(rounds(&driver), 10);
        assert_eq!(scheduler.state(), BurstState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn firing_just_before_the_deadline_counts_as_after_it() {
        let (_driver, scheduler) = scheduler(OverlapPolicy::Skip);

        scheduler.trigger();
        time::sleep(Duration::from_secs(58)).await;
        assert_eq!(scheduler.trigger(), TriggerOutcome::Ignored);

        time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(scheduler.trigger(), TriggerOutcome::Started);
        assert_eq!(scheduler.bursts_started(), 2);
    }

    #[tokio::test]
    async fn cron_firings_each_start_a_burst() {
        let driver = Arc::new(CountingDriver::default());
        let shutdown = CancellationToken::new();
        let scheduler = Arc::new(BurstScheduler::new(
            Arc::clone(&driver),
            BurstSettings {
                interval: Duration::from_millis(250),
                duration: Duration::from_secs(1),
                overlap: OverlapPolicy::Skip,
            },
            shutdown.clone(),
        ));
        // Fires every second: the period equals the burst duration.
        let schedule: CronSchedule = "* * * * * *".parse().unwrap();

        let from = Local::now();
        let task = {
            let scheduler = Arc::clone(&scheduler);
            let schedule = schedule.clone();
            tokio::spawn(async move { scheduler.run(&schedule).await })
        };
        time::sleep(Duration::from_millis(4_200)).await;
        let until = Local::now();
        shutdown.cancel();
        task.await.unwrap();

        // Firings safely inside the observed window.
        let mut firings = 0u64;
        let mut t = from + TimeDelta::milliseconds(50);
        let last = until - TimeDelta::milliseconds(150);
        while let Some(next) = schedule.next_after(&t) {
            if next > last {
                break;
            }
            firings += 1;
            t = next;
        }
        assert!(firings >= 3);

        let started = scheduler.bursts_started();
        assert!(started >= firings, "{started} bursts for {firings} firings");
        // Every burst but the last ran its full window of three rounds.
        assert!(rounds(&driver) as u64 >= 3 * (started - 1));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_timer() {
        let (driver, scheduler) = scheduler(OverlapPolicy::Skip);

        scheduler.trigger();
        time::sleep(Duration::from_secs(25)).await;
        scheduler.stop();
        assert_eq!(scheduler.state(), BurstState::Idle);

        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(rounds(&driver), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn run_exits_on_shutdown() {
        let driver = Arc::new(CountingDriver::default());
        let shutdown = CancellationToken::new();
        let scheduler = Arc::new(BurstScheduler::new(
            driver,
            BurstSettings {
                interval: Duration::from_secs(10),
                duration: Duration::from_secs(60),
                overlap: OverlapPolicy::Skip,
            },
            shutdown.clone(),
        ));
        let schedule: CronSchedule = "* * * * *".parse().unwrap();

        let task = {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move { scheduler.run(&schedule).await })
        };

        shutdown.cancel();
        time::timeout(Duration::from_secs(1), task)
            .await
            .expect("scheduler should stop promptly")
            .unwrap();
        assert_eq!(scheduler.state(), BurstState::Idle);
    }
}
