#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Brigade Metrics
//!
//! Prometheus exporter for a Brigade 2 orchestration server.
//!
//! ## Overview
//!
//! On a fixed interval the exporter samples the Brigade REST API (events,
//! their workers and jobs, users, service accounts, projects and the
//! substrate's running-job counter), derives counts and durations, and
//! publishes them as gauges on a `/metrics` endpoint for Prometheus to
//! scrape.
//!
//! ```text
//!   Scheduler ──tick──▶ Aggregator ──▶ Fetcher ──▶ OrchestratorApi (HTTP)
//!                            │
//!                            ▼
//!                        GaugeStore ◀── GET /metrics
//! ```
//!
//! ## Module Organization
//!
//! - [`client`] - The remote API trait and its HTTP implementation
//! - [`fetcher`] - Counts and paginated collections over the API
//! - [`aggregator`] - Phase bucketing, durations and gauge publication
//! - [`gauges`] - Gauge catalogue and the store the endpoint renders
//! - [`scheduler`] - Periodic, non-overlapping scrape loop
//! - [`web`] - Exposition and health endpoints
//! - [`bootstrap`] - Wiring and lifecycle of all of the above
//! - [`config`] - Layered process configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use brigade_metrics::{ExporterBootstrap, ExporterConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExporterConfig::load(None)?;
//! let handle = ExporterBootstrap::bootstrap(&config).await?;
//! println!("Serving metrics on {}", handle.local_addr());
//! handle.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod bootstrap;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod fetcher;
pub mod gauges;
pub mod logging;
pub mod models;
pub mod scheduler;
pub mod web;

pub use aggregator::{Aggregator, CycleReport, PhaseCountStrategy, View};
pub use bootstrap::{ExporterBootstrap, ExporterHandle};
pub use client::{ApiClientConfig, BrigadeApiClient, OrchestratorApi};
pub use config::ExporterConfig;
pub use error::{ExporterError, ExporterResult};
pub use fetcher::{EventCollection, Fetcher};
pub use gauges::{GaugeSnapshot, GaugeStore, LabelKey};
pub use models::{Event, JobPhase, WorkerPhase};
pub use scheduler::{CycleStats, Scheduler, SchedulerHandle, SchedulerState};
