//! Static declaration of every gauge family the exporter publishes.

use crate::constants::{labels, metrics};
use crate::models::{JobPhase, WorkerPhase};

/// Declaration of one gauge family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaugeDef {
    pub name: &'static str,
    pub help: &'static str,
    /// Label dimensions, in the order label values are supplied. Empty for
    /// scalar gauges.
    pub labels: &'static [&'static str],
}

impl GaugeDef {
    const fn scalar(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            help,
            labels: &[],
        }
    }

    const fn labeled(
        name: &'static str,
        help: &'static str,
        labels: &'static [&'static str],
    ) -> Self {
        Self { name, help, labels }
    }

    pub fn is_scalar(&self) -> bool {
        self.labels.is_empty()
    }
}

pub const CATALOGUE: &[GaugeDef] = &[
    GaugeDef::scalar(
        metrics::RUNNING_JOBS_TOTAL,
        "The total number of running jobs",
    ),
    GaugeDef::scalar(
        metrics::PENDING_JOBS_TOTAL,
        "The total number of pending jobs under running workers",
    ),
    GaugeDef::labeled(
        metrics::WORKERS_BY_PHASE,
        "All workers separated by phase",
        &[WorkerPhase::LABEL],
    ),
    GaugeDef::labeled(
        metrics::JOBS_BY_PHASE,
        "All jobs separated by phase",
        &[JobPhase::LABEL],
    ),
    GaugeDef::labeled(
        metrics::RUNNING_WORKERS_DURATION,
        "Seconds since each running worker started",
        &[labels::WORKER],
    ),
    GaugeDef::labeled(
        metrics::RUNNING_JOBS_DURATION,
        "Seconds since each running job started",
        &[labels::WORKER, labels::JOB],
    ),
    GaugeDef::labeled(
        metrics::RUNNING_WORKERS_BY_PROJECT,
        "Running workers per project",
        &[labels::PROJECT_ID],
    ),
    GaugeDef::scalar(metrics::USERS_TOTAL, "The total number of users"),
    GaugeDef::scalar(
        metrics::SERVICE_ACCOUNTS_TOTAL,
        "The total number of service accounts",
    ),
    GaugeDef::scalar(
        metrics::PROJECTS_TOTAL,
        "The total number of brigade projects",
    ),
    GaugeDef::scalar(
        metrics::SCRAPE_DURATION_SECONDS,
        "Wall time of the last scrape cycle in seconds",
    ),
    GaugeDef::scalar(
        metrics::SCRAPE_FAILURES,
        "Number of upstream views that failed during the last scrape cycle",
    ),
    GaugeDef::scalar(
        metrics::LAST_SCRAPE_TIMESTAMP_SECONDS,
        "Unix time at which the last scrape cycle completed",
    ),
];
