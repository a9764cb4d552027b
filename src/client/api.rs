use async_trait::async_trait;

use crate::error::ExporterResult;
use crate::models::{CountOnlyPage, EventPage, ListOptions, SubstrateJobCount, WorkerPhase};

/// Listing and counting operations offered by the remote orchestrator
///
/// Implementations perform exactly one remote call per method: no retries,
/// no caching and no pagination following. Failures are returned as
/// [`ExporterError::UpstreamUnavailable`](crate::error::ExporterError::UpstreamUnavailable).
#[async_trait]
pub trait OrchestratorApi: Send + Sync {
    /// Number of jobs the substrate currently reports as running
    async fn count_running_jobs(&self) -> ExporterResult<SubstrateJobCount>;

    /// One page of events. An empty `worker_phases` slice lists every event
    /// regardless of worker phase.
    async fn list_events(
        &self,
        worker_phases: &[WorkerPhase],
        options: &ListOptions,
    ) -> ExporterResult<EventPage>;

    async fn list_users(&self, options: &ListOptions) -> ExporterResult<CountOnlyPage>;

    async fn list_service_accounts(&self, options: &ListOptions)
        -> ExporterResult<CountOnlyPage>;

    async fn list_projects(&self, options: &ListOptions) -> ExporterResult<CountOnlyPage>;
}
