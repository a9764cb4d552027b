//! Pure computations over one cycle's event snapshot.
//!
//! Nothing here performs I/O or touches the gauge store, so every derived
//! value can be tested directly against hand-built events.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

use crate::error::ExporterError;
use crate::gauges::LabelKey;
use crate::models::{Event, JobPhase, WorkerPhase};

/// Events grouped by the phase of their worker
#[derive(Debug, Default)]
pub struct PhaseBuckets<'a> {
    buckets: BTreeMap<WorkerPhase, Vec<&'a Event>>,
}

impl<'a> PhaseBuckets<'a> {
    pub fn from_events(events: &'a [Event]) -> Self {
        let mut buckets: BTreeMap<WorkerPhase, Vec<&'a Event>> = BTreeMap::new();
        for event in events {
            buckets.entry(event.worker_phase()).or_default().push(event);
        }
        Self { buckets }
    }

    /// Events whose worker is in `phase`, in listing order
    pub fn get(&self, phase: WorkerPhase) -> &[&'a Event] {
        self.buckets.get(&phase).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn count(&self, phase: WorkerPhase) -> u64 {
        self.get(phase).len() as u64
    }

    /// Count for every phase of the enumeration, zeros included
    pub fn counts(&self) -> BTreeMap<WorkerPhase, u64> {
        WorkerPhase::ALL
            .into_iter()
            .map(|phase| (phase, self.count(phase)))
            .collect()
    }
}

/// Count of every job of every event by job phase, zeros included
pub fn count_jobs_by_phase(events: &[Event]) -> BTreeMap<JobPhase, u64> {
    let mut counts: BTreeMap<JobPhase, u64> =
        JobPhase::ALL.into_iter().map(|phase| (phase, 0)).collect();
    for job in events.iter().flat_map(|event| &event.worker.jobs) {
        *counts.entry(job.status.phase).or_default() += 1;
    }
    counts
}

/// Values derived from the workers currently in the Running phase
#[derive(Debug, Default)]
pub struct RunningSummary {
    /// Seconds since start, keyed by worker (event) ID
    pub worker_durations: BTreeMap<LabelKey, f64>,
    /// Seconds since start, keyed by (worker ID, job name)
    pub job_durations: BTreeMap<LabelKey, f64>,
    /// Pending jobs belonging to running workers
    pub pending_jobs: u64,
    /// Running workers per project ID
    pub workers_by_project: BTreeMap<LabelKey, f64>,
    /// Entities skipped because they violated an invariant
    pub faults: Vec<ExporterError>,
}

impl RunningSummary {
    /// Summarize events whose workers are Running
    ///
    /// Events in any other phase are ignored, so callers may pass either the
    /// Running bucket or a phase-filtered listing.
    pub fn from_running<'a, I>(events: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut summary = Self::default();

        for event in events {
            if event.worker_phase() != WorkerPhase::Running {
                continue;
            }

            *summary
                .workers_by_project
                .entry(LabelKey::single(event.project_id.as_str()))
                .or_default() += 1.0;

            match event.worker.status.started {
                Some(started) => {
                    summary
                        .worker_durations
                        .insert(LabelKey::single(event.id()), seconds_since(started, now));
                }
                None => summary.fault(ExporterError::integrity(
                    format!("worker {}", event.id()),
                    "running worker has no start timestamp",
                )),
            }

            for job in &event.worker.jobs {
                match job.status.phase {
                    JobPhase::Pending => summary.pending_jobs += 1,
                    JobPhase::Running => match job.status.started {
                        Some(started) => {
                            summary.job_durations.insert(
                                LabelKey::new([event.id(), job.name.as_str()]),
                                seconds_since(started, now),
                            );
                        }
                        None => summary.fault(ExporterError::integrity(
                            format!("job {}/{}", event.id(), job.name),
                            "running job has no start timestamp",
                        )),
                    },
                    _ => {}
                }
            }
        }

        summary
    }

    pub fn worker_keys(&self) -> BTreeSet<LabelKey> {
        self.worker_durations.keys().cloned().collect()
    }

    pub fn job_keys(&self) -> BTreeSet<LabelKey> {
        self.job_durations.keys().cloned().collect()
    }

    pub fn project_keys(&self) -> BTreeSet<LabelKey> {
        self.workers_by_project.keys().cloned().collect()
    }

    fn fault(&mut self, error: ExporterError) {
        warn!(error = %error, "Skipping entity");
        self.faults.push(error);
    }
}

/// Seconds elapsed from `started` to `now`, clamped at zero for clock skew
pub fn seconds_since(started: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - started)
        .to_std()
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0)
}
