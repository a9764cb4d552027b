//! # Scrape Scheduler
//!
//! Drives one aggregation pass per tick of a fixed interval.
//!
//! ```text
//!            tick                 pass complete
//!   Idle ───────────▶ Running ─────────────────▶ Idle
//!    │                   │
//!    └──── cancel ───────┴──── cancel ─────────▶ Stopped
//! ```
//!
//! The loop is a single task, so at most one pass is ever in flight. Ticks
//! that come due while a pass is running are dropped rather than queued,
//! which bounds the load placed on the remote API however slow a pass gets.
//! Cancellation is observed while idle immediately and, during a pass,
//! between views.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::aggregator::{Aggregator, CycleReport};
use crate::error::{ExporterError, ExporterResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulerState {
    /// Waiting for the next tick
    Idle,
    /// One aggregation pass in flight
    Running,
    /// Terminal; no further ticks
    Stopped,
}

impl std::fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Counters describing the scheduler's progress, shared with the web layer
#[derive(Debug, Default)]
pub struct CycleStats {
    completed_cycles: AtomicU64,
    failed_cycles: AtomicU64,
    dropped_ticks: AtomicU64,
}

impl CycleStats {
    pub fn completed_cycles(&self) -> u64 {
        self.completed_cycles.load(Ordering::Acquire)
    }

    pub fn failed_cycles(&self) -> u64 {
        self.failed_cycles.load(Ordering::Acquire)
    }

    pub fn dropped_ticks(&self) -> u64 {
        self.dropped_ticks.load(Ordering::Acquire)
    }

    /// Whether at least one pass has run to completion
    pub fn has_completed_cycle(&self) -> bool {
        self.completed_cycles() > 0
    }

    fn record(&self, report: &CycleReport) {
        if report.cancelled {
            return;
        }
        self.completed_cycles.fetch_add(1, Ordering::AcqRel);
        if !report.is_success() {
            self.failed_cycles.fetch_add(1, Ordering::AcqRel);
        }
    }
}

#[derive(Debug)]
pub struct Scheduler {
    aggregator: Aggregator,
    interval: Duration,
    stats: Arc<CycleStats>,
}

impl Scheduler {
    pub fn new(aggregator: Aggregator, interval: Duration) -> ExporterResult<Self> {
        if interval.is_zero() {
            return Err(ExporterError::config("Scrape interval must be greater than zero"));
        }
        Ok(Self {
            aggregator,
            interval,
            stats: Arc::new(CycleStats::default()),
        })
    }

    pub fn stats(&self) -> Arc<CycleStats> {
        Arc::clone(&self.stats)
    }

    /// Spawn the scrape loop; the first pass starts immediately
    ///
    /// The loop stops when `cancel` is triggered, either directly or through
    /// [`SchedulerHandle::stop`].
    pub fn spawn(self, cancel: CancellationToken) -> SchedulerHandle {
        let (state_tx, state_rx) = watch::channel(SchedulerState::Idle);
        let stats = Arc::clone(&self.stats);

        info!(
            interval_secs = self.interval.as_secs_f64(),
            strategy = %self.aggregator.strategy(),
            "Starting scrape scheduler"
        );

        let task_cancel = cancel.clone();
        let join = tokio::spawn(async move { self.run(task_cancel, state_tx).await });

        SchedulerHandle {
            cancel,
            state: state_rx,
            stats,
            join,
        }
    }

    async fn run(self, cancel: CancellationToken, state: watch::Sender<SchedulerState>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            state.send_replace(SchedulerState::Running);
            let pass_started = Instant::now();

            let report = self.aggregator.run_cycle(Utc::now(), &cancel).await;
            self.stats.record(&report);
            log_report(&report);

            let dropped = ticks_elapsed(pass_started.elapsed(), self.interval);
            if dropped > 0 {
                self.stats.dropped_ticks.fetch_add(dropped, Ordering::AcqRel);
                debug!(dropped, "Pass outlasted the interval; dropped ticks that came due");
            }

            if cancel.is_cancelled() {
                break;
            }
            state.send_replace(SchedulerState::Idle);
        }

        state.send_replace(SchedulerState::Stopped);
        info!(
            completed_cycles = self.stats.completed_cycles(),
            dropped_ticks = self.stats.dropped_ticks(),
            "Scrape scheduler stopped"
        );
    }
}

fn ticks_elapsed(elapsed: Duration, interval: Duration) -> u64 {
    (elapsed.as_nanos() / interval.as_nanos()) as u64
}

fn log_report(report: &CycleReport) {
    if report.cancelled {
        info!(skipped = report.skipped.len(), "Scrape cycle interrupted by shutdown");
    } else if report.is_success() {
        debug!(
            elapsed_ms = report.elapsed.as_millis() as u64,
            pruned_series = report.pruned_series,
            integrity_faults = report.integrity_faults,
            "Scrape cycle complete"
        );
    } else {
        warn!(
            failed_views = report.failed_views(),
            published = report.published.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Scrape cycle completed with failures"
        );
    }
}

/// Owner's handle on a running scheduler
#[derive(Debug)]
pub struct SchedulerHandle {
    cancel: CancellationToken,
    state: watch::Receiver<SchedulerState>,
    stats: Arc<CycleStats>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    /// Receiver notified on every state transition
    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.clone()
    }

    pub fn stats(&self) -> Arc<CycleStats> {
        Arc::clone(&self.stats)
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Signal cancellation and wait for the loop to terminate
    pub async fn stop(self) -> ExporterResult<()> {
        self.cancel.cancel();
        self.join().await
    }

    /// Wait for the loop to terminate without signalling it
    pub async fn join(self) -> ExporterResult<()> {
        self.join.await.map_err(|e| {
            ExporterError::Io(std::io::Error::other(format!(
                "scheduler task terminated abnormally: {e}"
            )))
        })
    }
}
