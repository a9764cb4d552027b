//! # Aggregator
//!
//! Turns one cycle's fetched data into gauge values.
//!
//! Each cycle is split into independent views (running-jobs counter, events,
//! users, service accounts, projects). A view that fails to fetch leaves its
//! gauges at their last-known values; the other views are still computed and
//! published. Listings are not transactionally consistent with each other, so
//! gauges from different views may describe slightly different instants.
//!
//! The events view is all-or-nothing: its gauges are written only once every
//! listing it needs has been fetched. Labeled families keyed by entity
//! identity are then pruned so that their label set equals exactly the set of
//! entities currently Running.

pub mod buckets;
pub mod report;
pub mod strategy;

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::constants::metrics;
use crate::error::{ExporterError, ExporterResult};
use crate::fetcher::{EventCollection, Fetcher};
use crate::gauges::{GaugeStore, LabelKey};
use crate::models::{JobPhase, WorkerPhase};

pub use buckets::{count_jobs_by_phase, seconds_since, PhaseBuckets, RunningSummary};
pub use report::{CycleReport, View, ViewFailure};
pub use strategy::PhaseCountStrategy;

#[derive(Debug, Clone)]
pub struct Aggregator {
    fetcher: Fetcher,
    store: GaugeStore,
    strategy: PhaseCountStrategy,
}

impl Aggregator {
    pub fn new(fetcher: Fetcher, store: GaugeStore, strategy: PhaseCountStrategy) -> Self {
        Self {
            fetcher,
            store,
            strategy,
        }
    }

    pub fn store(&self) -> &GaugeStore {
        &self.store
    }

    pub fn strategy(&self) -> PhaseCountStrategy {
        self.strategy
    }

    /// Run one fetch-aggregate-publish pass with `now` as the duration origin
    ///
    /// Cancellation is checked before each view; a view already in flight
    /// runs to completion.
    pub async fn run_cycle(&self, now: DateTime<Utc>, cancel: &CancellationToken) -> CycleReport {
        let started = Instant::now();
        let mut report = CycleReport::default();

        for view in View::ALL {
            if cancel.is_cancelled() {
                report.cancelled = true;
                report.skipped.push(view);
                continue;
            }

            let result = match view {
                View::RunningJobs => self.publish_running_jobs().await,
                View::Events => self.publish_events(now, &mut report).await,
                View::Users => {
                    self.publish_count(metrics::USERS_TOTAL, self.fetcher.count_users())
                        .await
                }
                View::ServiceAccounts => {
                    self.publish_count(
                        metrics::SERVICE_ACCOUNTS_TOTAL,
                        self.fetcher.count_service_accounts(),
                    )
                    .await
                }
                View::Projects => {
                    self.publish_count(metrics::PROJECTS_TOTAL, self.fetcher.count_projects())
                        .await
                }
            };

            match result {
                Ok(()) => report.published.push(view),
                Err(error) => {
                    warn!(view = %view, error = %error, "View failed; keeping last-known values");
                    report.failures.push(ViewFailure { view, error });
                }
            }
        }

        report.elapsed = started.elapsed();
        self.publish_self_metrics(&report);

        debug!(
            published = report.published.len(),
            failed_views = report.failed_views(),
            skipped = report.skipped.len(),
            integrity_faults = report.integrity_faults,
            pruned_series = report.pruned_series,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Aggregation pass finished"
        );

        report
    }

    async fn publish_running_jobs(&self) -> ExporterResult<()> {
        let count = self.fetcher.count_running_jobs().await?;
        self.store
            .set_scalar(metrics::RUNNING_JOBS_TOTAL, count as f64)
    }

    async fn publish_count<F>(&self, metric: &str, count: F) -> ExporterResult<()>
    where
        F: std::future::Future<Output = ExporterResult<u64>>,
    {
        let count = count.await?;
        self.store.set_scalar(metric, count as f64)
    }

    async fn publish_events(
        &self,
        now: DateTime<Utc>,
        report: &mut CycleReport,
    ) -> ExporterResult<()> {
        match self.strategy {
            PhaseCountStrategy::Bucketed => self.publish_events_bucketed(now, report).await,
            PhaseCountStrategy::PerPhase => self.publish_events_per_phase(now, report).await,
        }
    }

    async fn publish_events_bucketed(
        &self,
        now: DateTime<Utc>,
        report: &mut CycleReport,
    ) -> ExporterResult<()> {
        let collection = self.fetcher.collect_events(None).await?;
        ensure_complete(&collection)?;

        let buckets = PhaseBuckets::from_events(&collection.events);
        self.publish_phase_counts(metrics::WORKERS_BY_PHASE, buckets.counts())?;
        self.publish_phase_counts(
            metrics::JOBS_BY_PHASE,
            count_jobs_by_phase(&collection.events),
        )?;

        let summary =
            RunningSummary::from_running(buckets.get(WorkerPhase::Running).iter().copied(), now);
        self.publish_running_summary(&summary, report)
    }

    async fn publish_events_per_phase(
        &self,
        now: DateTime<Utc>,
        report: &mut CycleReport,
    ) -> ExporterResult<()> {
        let mut counts = BTreeMap::new();
        for phase in WorkerPhase::ALL {
            if phase != WorkerPhase::Running {
                counts.insert(phase, self.fetcher.count_events(Some(&[phase])).await?);
            }
        }

        // The running listing feeds both its own count and every per-entity gauge
        let running = self
            .fetcher
            .collect_events(Some(&[WorkerPhase::Running]))
            .await?;
        ensure_complete(&running)?;
        counts.insert(WorkerPhase::Running, running.total());

        self.publish_phase_counts(metrics::WORKERS_BY_PHASE, counts)?;
        let summary = RunningSummary::from_running(&running.events, now);
        self.publish_running_summary(&summary, report)
    }

    fn publish_phase_counts<P>(&self, metric: &str, counts: BTreeMap<P, u64>) -> ExporterResult<()>
    where
        P: PhaseLabel,
    {
        for (phase, count) in counts {
            self.store
                .set_labeled(metric, &LabelKey::single(phase.label()), count as f64)?;
        }
        Ok(())
    }

    fn publish_running_summary(
        &self,
        summary: &RunningSummary,
        report: &mut CycleReport,
    ) -> ExporterResult<()> {
        report.integrity_faults += summary.faults.len();

        self.store
            .set_scalar(metrics::PENDING_JOBS_TOTAL, summary.pending_jobs as f64)?;

        let families = [
            (
                metrics::RUNNING_WORKERS_DURATION,
                &summary.worker_durations,
                summary.worker_keys(),
            ),
            (
                metrics::RUNNING_JOBS_DURATION,
                &summary.job_durations,
                summary.job_keys(),
            ),
            (
                metrics::RUNNING_WORKERS_BY_PROJECT,
                &summary.workers_by_project,
                summary.project_keys(),
            ),
        ];

        for (metric, values, keys) in families {
            for (key, value) in values {
                self.store.set_labeled(metric, key, *value)?;
            }
            let pruned = self.store.retain_labeled(metric, &keys)?;
            if pruned > 0 {
                debug!(metric, pruned, "Pruned stale series");
            }
            report.pruned_series += pruned;
        }

        Ok(())
    }

    fn publish_self_metrics(&self, report: &CycleReport) {
        let now_secs = Utc::now().timestamp_millis() as f64 / 1000.0;
        let results = [
            self.store.set_scalar(
                metrics::SCRAPE_DURATION_SECONDS,
                report.elapsed.as_secs_f64(),
            ),
            self.store
                .set_scalar(metrics::SCRAPE_FAILURES, report.failed_views() as f64),
            self.store
                .set_scalar(metrics::LAST_SCRAPE_TIMESTAMP_SECONDS, now_secs),
        ];
        for error in results.into_iter().filter_map(Result::err) {
            warn!(error = %error, "Failed to record exporter self-metrics");
        }
    }
}

/// Phase types that can be published as a label value
pub trait PhaseLabel: Ord {
    fn label(&self) -> &'static str;
}

impl PhaseLabel for WorkerPhase {
    fn label(&self) -> &'static str {
        self.as_str()
    }
}

impl PhaseLabel for JobPhase {
    fn label(&self) -> &'static str {
        self.as_str()
    }
}

/// Per-entity gauges and pruning need every Running event, so a listing cut
/// short by the page cap fails the whole events view
fn ensure_complete(collection: &EventCollection) -> ExporterResult<()> {
    if collection.is_complete() {
        return Ok(());
    }
    Err(ExporterError::TruncatedListing {
        pages: collection.pages,
        transferred: collection.events.len(),
        remaining: collection.remaining_item_count,
    })
}
