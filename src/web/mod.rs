//! # Exposition Web Server
//!
//! Serves the gauge store in the Prometheus text format on `/metrics`, plus
//! health probes. Handlers only read the store, so a slow or failing scrape
//! pass never delays a response.

use axum::http::StatusCode;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use crate::error::ExporterResult;

pub mod handlers;
pub mod response_types;
pub mod routes;
pub mod state;

pub use state::{ExporterWebState, WebConfig};

/// Create the exporter web application with all routes and middleware
pub fn create_app(state: Arc<ExporterWebState>) -> Router {
    let common_middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.request_timeout,
        ));

    Router::new()
        .merge(routes::health_routes())
        .merge(routes::metrics_routes())
        .layer(common_middleware)
        .with_state(state)
}

/// Serve `app` on `listener` until `shutdown` is cancelled
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> ExporterResult<()> {
    let local_addr = listener.local_addr()?;
    info!(address = %local_addr, "Metrics endpoint listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Metrics endpoint stopped");
    Ok(())
}
