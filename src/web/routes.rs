//! Exporter Web Routes

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::web::{handlers, state::ExporterWebState};

/// Health check routes for Kubernetes probes
pub fn health_routes() -> Router<Arc<ExporterWebState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check))
}

/// Prometheus scrape route
pub fn metrics_routes() -> Router<Arc<ExporterWebState>> {
    Router::new().route("/metrics", get(handlers::metrics::prometheus_metrics))
}
