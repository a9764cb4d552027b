//! Scriptable in-memory orchestrator for driving the fetcher, aggregator and
//! scheduler without a network.

#![allow(dead_code)]

use async_trait::async_trait;
use brigade_metrics::models::{
    CountOnlyPage, EventPage, ListMeta, ListOptions, ListPage, SubstrateJobCount,
};
use brigade_metrics::{Event, ExporterError, ExporterResult, OrchestratorApi, WorkerPhase};
use parking_lot::Mutex;
use serde::de::IgnoredAny;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    RunningJobs,
    Events,
    Users,
    ServiceAccounts,
    Projects,
}

#[derive(Debug, Default)]
struct MockState {
    events: Vec<Event>,
    running_jobs: u64,
    users: u64,
    service_accounts: u64,
    projects: u64,
    page_size: Option<usize>,
    failing: HashSet<Endpoint>,
    calls: HashMap<Endpoint, usize>,
    event_queries: Vec<(Vec<WorkerPhase>, Option<String>)>,
    delay: Option<Duration>,
    in_flight: usize,
    max_in_flight: usize,
}

#[derive(Debug, Default)]
pub struct MockOrchestratorApi {
    state: Mutex<MockState>,
}

impl MockOrchestratorApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(self, events: Vec<Event>) -> Self {
        self.set_events(events);
        self
    }

    pub fn with_running_jobs(self, count: u64) -> Self {
        self.state.lock().running_jobs = count;
        self
    }

    pub fn with_counts(self, users: u64, service_accounts: u64, projects: u64) -> Self {
        {
            let mut state = self.state.lock();
            state.users = users;
            state.service_accounts = service_accounts;
            state.projects = projects;
        }
        self
    }

    /// Split event listings into pages of `size` items
    pub fn with_page_size(self, size: usize) -> Self {
        self.state.lock().page_size = Some(size.max(1));
        self
    }

    /// Sleep this long inside every call
    pub fn with_delay(self, delay: Duration) -> Self {
        self.state.lock().delay = Some(delay);
        self
    }

    pub fn set_events(&self, events: Vec<Event>) {
        self.state.lock().events = events;
    }

    pub fn set_running_jobs(&self, count: u64) {
        self.state.lock().running_jobs = count;
    }

    pub fn set_users(&self, count: u64) {
        self.state.lock().users = count;
    }

    pub fn set_projects(&self, count: u64) {
        self.state.lock().projects = count;
    }

    pub fn fail(&self, endpoint: Endpoint) {
        self.state.lock().failing.insert(endpoint);
    }

    pub fn recover(&self, endpoint: Endpoint) {
        self.state.lock().failing.remove(&endpoint);
    }

    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.state.lock().calls.get(&endpoint).copied().unwrap_or(0)
    }

    /// Phase filter and continue token of every event request, in order
    pub fn event_queries(&self) -> Vec<(Vec<WorkerPhase>, Option<String>)> {
        self.state.lock().event_queries.clone()
    }

    /// Highest number of calls observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.state.lock().max_in_flight
    }

    fn begin(&self, endpoint: Endpoint) -> (ExporterResult<()>, Option<Duration>) {
        let mut state = self.state.lock();
        *state.calls.entry(endpoint).or_default() += 1;
        state.in_flight += 1;
        state.max_in_flight = state.max_in_flight.max(state.in_flight);
        let result = if state.failing.contains(&endpoint) {
            Err(ExporterError::upstream(
                format!("{endpoint:?}"),
                "503 Service Unavailable",
            ))
        } else {
            Ok(())
        };
        (result, state.delay)
    }

    fn end(&self) {
        self.state.lock().in_flight -= 1;
    }

    async fn call<T>(
        &self,
        endpoint: Endpoint,
        respond: impl FnOnce(&MockState) -> T,
    ) -> ExporterResult<T> {
        let (admitted, delay) = self.begin(endpoint);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let result = admitted.map(|()| respond(&*self.state.lock()));
        self.end();
        result
    }

    fn count_page(count: u64) -> CountOnlyPage {
        // Transfer at most one item and report the rest as remaining
        let transferred = count.min(1) as usize;
        ListPage::new(vec![IgnoredAny; transferred], count - transferred as u64)
    }
}

fn event_page(state: &MockState, phases: &[WorkerPhase], options: &ListOptions) -> EventPage {
    let matching: Vec<&Event> = state
        .events
        .iter()
        .filter(|event| phases.is_empty() || phases.contains(&event.worker_phase()))
        .collect();

    let start = options
        .continue_token
        .as_deref()
        .and_then(|token| token.parse::<usize>().ok())
        .unwrap_or(0)
        .min(matching.len());
    let end = match state.page_size {
        Some(size) => (start + size).min(matching.len()),
        None => matching.len(),
    };

    ListPage {
        metadata: ListMeta {
            continue_token: (end < matching.len()).then(|| end.to_string()),
            remaining_item_count: (matching.len() - end) as u64,
        },
        items: matching[start..end].iter().map(|e| (*e).clone()).collect(),
    }
}

#[async_trait]
impl OrchestratorApi for MockOrchestratorApi {
    async fn count_running_jobs(&self) -> ExporterResult<SubstrateJobCount> {
        self.call(Endpoint::RunningJobs, |state| SubstrateJobCount {
            count: state.running_jobs,
        })
        .await
    }

    async fn list_events(
        &self,
        worker_phases: &[WorkerPhase],
        options: &ListOptions,
    ) -> ExporterResult<EventPage> {
        self.state
            .lock()
            .event_queries
            .push((worker_phases.to_vec(), options.continue_token.clone()));
        self.call(Endpoint::Events, |state| {
            event_page(state, worker_phases, options)
        })
        .await
    }

    async fn list_users(&self, _options: &ListOptions) -> ExporterResult<CountOnlyPage> {
        self.call(Endpoint::Users, |state| Self::count_page(state.users))
            .await
    }

    async fn list_service_accounts(
        &self,
        _options: &ListOptions,
    ) -> ExporterResult<CountOnlyPage> {
        self.call(Endpoint::ServiceAccounts, |state| {
            Self::count_page(state.service_accounts)
        })
        .await
    }

    async fn list_projects(&self, _options: &ListOptions) -> ExporterResult<CountOnlyPage> {
        self.call(Endpoint::Projects, |state| Self::count_page(state.projects))
            .await
    }
}
