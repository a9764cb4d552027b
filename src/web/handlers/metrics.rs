//! # Metrics Handler
//!
//! Prometheus exposition endpoint. Rendering reads the gauge store only and
//! never blocks on a scrape pass.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::{debug, error};

use crate::web::state::ExporterWebState;

/// Prometheus metrics endpoint: GET /metrics
pub async fn prometheus_metrics(State(state): State<Arc<ExporterWebState>>) -> Response {
    debug!("Serving Prometheus metrics");

    let store = state.store();
    match store.render() {
        Ok(body) => ([(header::CONTENT_TYPE, store.content_type())], body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to encode metrics: {e}"),
            )
                .into_response()
        }
    }
}
