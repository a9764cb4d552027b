//! # Fetcher
//!
//! Narrow view of the [`OrchestratorApi`] that the aggregator needs: counts
//! derived from pagination envelopes, single event pages, and full event
//! collections assembled by following continue tokens.
//!
//! The fetcher performs no retries and no caching. Upstream failures are
//! returned verbatim so the aggregator can decide which gauges to leave at
//! their last-known values.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::client::OrchestratorApi;
use crate::constants::defaults;
use crate::error::ExporterResult;
use crate::models::{Event, EventPage, ListOptions, WorkerPhase};

/// Every event matching a query, assembled from one or more pages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventCollection {
    pub events: Vec<Event>,
    /// Matching events that were not transferred, non-zero only when the page
    /// cap was reached
    pub remaining_item_count: u64,
    pub pages: u32,
}

impl EventCollection {
    pub fn total(&self) -> u64 {
        self.events.len() as u64 + self.remaining_item_count
    }

    pub fn is_complete(&self) -> bool {
        self.remaining_item_count == 0
    }
}

#[derive(Clone)]
pub struct Fetcher {
    api: Arc<dyn OrchestratorApi>,
    max_pages: u32,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("max_pages", &self.max_pages)
            .finish()
    }
}

impl Fetcher {
    pub fn new(api: Arc<dyn OrchestratorApi>) -> Self {
        Self {
            api,
            max_pages: defaults::MAX_EVENT_PAGES,
        }
    }

    /// Cap on pages followed by [`Fetcher::collect_events`]; at least one
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub async fn count_running_jobs(&self) -> ExporterResult<u64> {
        Ok(self.api.count_running_jobs().await?.count)
    }

    /// One page of events; `None` lists events in every worker phase
    pub async fn list_events(&self, phases: Option<&[WorkerPhase]>) -> ExporterResult<EventPage> {
        self.api
            .list_events(phases.unwrap_or_default(), &ListOptions::default())
            .await
    }

    /// `len(items) + remainingItemCount` of one event page
    pub async fn count_events(&self, phases: Option<&[WorkerPhase]>) -> ExporterResult<u64> {
        Ok(self.list_events(phases).await?.total())
    }

    /// Every matching event, following continue tokens up to the page cap
    pub async fn collect_events(
        &self,
        phases: Option<&[WorkerPhase]>,
    ) -> ExporterResult<EventCollection> {
        let phases = phases.unwrap_or_default();
        let mut collection = EventCollection::default();
        let mut options = ListOptions::default();

        loop {
            let page = self.api.list_events(phases, &options).await?;
            collection.pages += 1;
            let next = page.continue_token().map(str::to_string);
            collection.remaining_item_count = page.metadata.remaining_item_count;
            collection.events.extend(page.items);

            match next {
                None => {
                    // The last page may still carry a stale estimate
                    collection.remaining_item_count = 0;
                    break;
                }
                Some(_) if collection.pages >= self.max_pages => {
                    warn!(
                        pages = collection.pages,
                        transferred = collection.events.len(),
                        remaining = collection.remaining_item_count,
                        "Event page cap reached; collection is partial"
                    );
                    break;
                }
                Some(token) => options = ListOptions::continuing(token),
            }
        }

        debug!(
            pages = collection.pages,
            events = collection.events.len(),
            "Collected events"
        );
        Ok(collection)
    }

    pub async fn count_users(&self) -> ExporterResult<u64> {
        Ok(self.api.list_users(&ListOptions::default()).await?.total())
    }

    pub async fn count_service_accounts(&self) -> ExporterResult<u64> {
        Ok(self
            .api
            .list_service_accounts(&ListOptions::default())
            .await?
            .total())
    }

    pub async fn count_projects(&self) -> ExporterResult<u64> {
        Ok(self.api.list_projects(&ListOptions::default()).await?.total())
    }
}
