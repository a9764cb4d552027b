//! # Exporter Bootstrap
//!
//! Wires the gauge store, fetcher, aggregator, scheduler and exposition
//! server together from an [`ExporterConfig`], and returns a handle that owns
//! their lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::aggregator::Aggregator;
use crate::client::{BrigadeApiClient, OrchestratorApi};
use crate::config::ExporterConfig;
use crate::error::{ExporterError, ExporterResult};
use crate::fetcher::Fetcher;
use crate::gauges::GaugeStore;
use crate::scheduler::{Scheduler, SchedulerHandle};
use crate::web::{self, ExporterWebState, WebConfig};

/// Running exporter: scrape loop plus exposition server
pub struct ExporterHandle {
    local_addr: SocketAddr,
    store: GaugeStore,
    scheduler: SchedulerHandle,
    server: JoinHandle<ExporterResult<()>>,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for ExporterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExporterHandle")
            .field("local_addr", &self.local_addr)
            .field("scheduler_state", &self.scheduler.state())
            .field("is_running", &!self.shutdown.is_cancelled())
            .finish()
    }
}

impl ExporterHandle {
    /// Address the exposition server is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn store(&self) -> &GaugeStore {
        &self.store
    }

    pub fn scheduler(&self) -> &SchedulerHandle {
        &self.scheduler
    }

    /// Stop the scrape loop, then drain the exposition server
    pub async fn stop(self) -> ExporterResult<()> {
        info!("Stopping exporter");
        self.shutdown.cancel();

        let scheduler_result = self.scheduler.stop().await;
        let server_result = match self.server.await {
            Ok(result) => result,
            Err(e) => Err(ExporterError::Io(std::io::Error::other(format!(
                "metrics server task terminated abnormally: {e}"
            )))),
        };

        if let Err(e) = &scheduler_result {
            warn!(error = %e, "Scheduler did not stop cleanly");
        }
        scheduler_result.and(server_result)
    }
}

pub struct ExporterBootstrap;

impl ExporterBootstrap {
    /// Start the exporter against the Brigade API named in `config`
    pub async fn bootstrap(config: &ExporterConfig) -> ExporterResult<ExporterHandle> {
        let client = BrigadeApiClient::new(config.api_client_config())?;
        Self::bootstrap_with_api(config, Arc::new(client)).await
    }

    /// Start the exporter against any [`OrchestratorApi`] implementation
    pub async fn bootstrap_with_api(
        config: &ExporterConfig,
        api: Arc<dyn OrchestratorApi>,
    ) -> ExporterResult<ExporterHandle> {
        let store = GaugeStore::new()?;
        let fetcher = Fetcher::new(api).with_max_pages(config.max_event_pages);
        let aggregator = Aggregator::new(fetcher, store.clone(), config.phase_count_strategy);
        let scheduler = Scheduler::new(aggregator, config.scrape_interval())?;

        let listener = TcpListener::bind(config.listen_addr()?).await?;
        let local_addr = listener.local_addr()?;

        let state = Arc::new(ExporterWebState::new(
            WebConfig::default(),
            store.clone(),
            scheduler.stats(),
        ));

        let shutdown = CancellationToken::new();
        let server = tokio::spawn(web::serve(
            listener,
            web::create_app(state),
            shutdown.child_token(),
        ));
        let scheduler = scheduler.spawn(shutdown.child_token());

        info!(
            address = %local_addr,
            interval_secs = config.prom_scrape_interval,
            strategy = %config.phase_count_strategy,
            "Exporter started"
        );

        Ok(ExporterHandle {
            local_addr,
            store,
            scheduler,
            server,
            shutdown,
        })
    }
}
