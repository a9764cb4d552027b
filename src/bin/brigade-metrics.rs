//! # Brigade Metrics Exporter
//!
//! Standalone server binary.
//!
//! ## Usage
//!
//! ```bash
//! API_ADDRESS=https://brigade.example.com API_TOKEN=... brigade-metrics
//!
//! # With a config file; environment variables still take precedence
//! brigade-metrics --config /etc/brigade-metrics.toml
//! ```

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info};

use brigade_metrics::logging;
use brigade_metrics::{ExporterBootstrap, ExporterConfig};

#[derive(Parser)]
#[command(name = "brigade-metrics")]
#[command(about = "Export Brigade 2 worker, job and project state as Prometheus gauges")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long, env = "BRIGADE_METRICS_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config =
        ExporterConfig::load(cli.config.as_deref()).context("Invalid exporter configuration")?;

    logging::init_structured_logging(config.log_format);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?config,
        "Starting Brigade metrics exporter"
    );

    let handle = ExporterBootstrap::bootstrap(&config)
        .await
        .context("Failed to start exporter")?;

    shutdown_signal().await;
    info!("Shutdown signal received, stopping");

    if let Err(e) = handle.stop().await {
        error!(error = %e, "Exporter did not stop cleanly");
    }

    info!("Brigade metrics exporter shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
