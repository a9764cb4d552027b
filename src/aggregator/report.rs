use std::fmt;
use std::time::Duration;

use crate::error::ExporterError;

/// Independently fetched and published group of gauges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum View {
    RunningJobs,
    Events,
    Users,
    ServiceAccounts,
    Projects,
}

impl View {
    /// Order in which views are processed within a cycle
    pub const ALL: [View; 5] = [
        View::RunningJobs,
        View::Events,
        View::Users,
        View::ServiceAccounts,
        View::Projects,
    ];
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunningJobs => write!(f, "running_jobs"),
            Self::Events => write!(f, "events"),
            Self::Users => write!(f, "users"),
            Self::ServiceAccounts => write!(f, "service_accounts"),
            Self::Projects => write!(f, "projects"),
        }
    }
}

#[derive(Debug)]
pub struct ViewFailure {
    pub view: View,
    pub error: ExporterError,
}

/// Outcome of one aggregation pass
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Views whose gauges were fully updated
    pub published: Vec<View>,
    /// Views whose data could not be fetched
    pub failures: Vec<ViewFailure>,
    /// Views not attempted because the pass was cancelled
    pub skipped: Vec<View>,
    pub integrity_faults: usize,
    /// Stale labeled series deleted during the pass
    pub pruned_series: usize,
    pub elapsed: Duration,
    pub cancelled: bool,
}

impl CycleReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }

    pub fn failed_views(&self) -> usize {
        self.failures.len()
    }

    pub fn failed(&self, view: View) -> bool {
        self.failures.iter().any(|f| f.view == view)
    }
}
