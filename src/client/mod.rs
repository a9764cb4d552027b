//! # Orchestrator API
//!
//! The remote capability the exporter samples, expressed as the
//! [`OrchestratorApi`] trait, plus [`BrigadeApiClient`], its HTTP
//! implementation against the Brigade 2 REST API.

pub mod api;
pub mod http;

pub use api::OrchestratorApi;
pub use http::{ApiClientConfig, BrigadeApiClient};
