#![allow(dead_code)]

pub mod builders;
pub mod mock_api;
pub mod strategies;

pub use builders::*;
pub use mock_api::*;

use brigade_metrics::{Aggregator, Fetcher, GaugeStore, PhaseCountStrategy};
use std::sync::Arc;

/// Aggregator over `api` with a fresh gauge store
pub fn aggregator_for(api: Arc<MockOrchestratorApi>, strategy: PhaseCountStrategy) -> Aggregator {
    let store = GaugeStore::new().expect("gauge store");
    Aggregator::new(Fetcher::new(api), store, strategy)
}
