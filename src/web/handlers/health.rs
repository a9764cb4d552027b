//! # Health Check Handlers
//!
//! Kubernetes-compatible probes. Liveness never depends on the remote API;
//! readiness only requires that one scrape pass has completed, whether or not
//! every view in it succeeded.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use std::sync::Arc;

use crate::web::response_types::{ErrorResponse, HealthResponse, ReadinessResponse};
use crate::web::state::ExporterWebState;

/// Basic health check endpoint: GET /health
pub async fn health_check(State(state): State<Arc<ExporterWebState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// Kubernetes readiness probe: GET /health/ready
pub async fn readiness_check(
    State(state): State<Arc<ExporterWebState>>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ErrorResponse>)> {
    if !state.is_ready() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new(
                "service_unavailable",
                "No scrape cycle has completed yet",
            )),
        ));
    }

    let cycles = state.cycles();
    Ok(Json(ReadinessResponse {
        status: "ready".to_string(),
        timestamp: Utc::now(),
        completed_cycles: cycles.completed_cycles(),
        failed_cycles: cycles.failed_cycles(),
        dropped_ticks: cycles.dropped_ticks(),
    }))
}
