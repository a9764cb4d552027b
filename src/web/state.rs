//! Exporter Web Application State
//!
//! Shared state for the exposition endpoints: the gauge store the handlers
//! render from, and the scheduler counters that drive readiness.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::gauges::GaugeStore;
use crate::scheduler::CycleStats;

/// Configuration for the exposition server
#[derive(Debug, Clone)]
pub struct WebConfig {
    pub request_timeout: Duration,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(30_000),
        }
    }
}

#[derive(Debug)]
pub struct ExporterWebState {
    pub config: WebConfig,
    store: GaugeStore,
    cycles: Arc<CycleStats>,
    started_at: Instant,
}

impl ExporterWebState {
    pub fn new(config: WebConfig, store: GaugeStore, cycles: Arc<CycleStats>) -> Self {
        Self {
            config,
            store,
            cycles,
            started_at: Instant::now(),
        }
    }

    pub fn store(&self) -> &GaugeStore {
        &self.store
    }

    pub fn cycles(&self) -> &CycleStats {
        &self.cycles
    }

    /// Ready once the scheduler has completed its first pass
    pub fn is_ready(&self) -> bool {
        self.cycles.has_completed_cycle()
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
