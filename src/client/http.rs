//! # Brigade API Client
//!
//! HTTP client for the Brigade 2 REST API. Handles bearer authentication,
//! optional TLS verification bypass, request timeouts and mapping of non-2xx
//! responses to upstream errors.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::api::OrchestratorApi;
use crate::constants::{api_paths, defaults};
use crate::error::{ExporterError, ExporterResult};
use crate::models::{CountOnlyPage, EventPage, ListOptions, SubstrateJobCount, WorkerPhase};

/// Connection settings for [`BrigadeApiClient`]
///
/// # Examples
///
/// ```rust
/// use brigade_metrics::client::ApiClientConfig;
///
/// let config = ApiClientConfig::new("https://brigade.example.com", "token");
/// assert!(config.allow_insecure_connections);
/// assert_eq!(config.timeout_ms, 30_000);
/// ```
#[derive(Clone)]
pub struct ApiClientConfig {
    /// Base address of the API server, beginning with http:// or https://
    pub base_url: String,
    /// API token obtained with the Brigade CLI
    pub token: String,
    /// Skip TLS certificate verification
    pub allow_insecure_connections: bool,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl ApiClientConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            allow_insecure_connections: defaults::API_IGNORE_CERT_WARNINGS,
            timeout_ms: defaults::API_REQUEST_TIMEOUT_MS,
        }
    }
}

impl std::fmt::Debug for ApiClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .field(
                "allow_insecure_connections",
                &self.allow_insecure_connections,
            )
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// [`OrchestratorApi`] implementation over HTTP
#[derive(Clone)]
pub struct BrigadeApiClient {
    client: Client,
    base_url: Url,
    timeout_ms: u64,
}

impl std::fmt::Debug for BrigadeApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrigadeApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl BrigadeApiClient {
    /// Create a client, validating the base address and token
    pub fn new(config: ApiClientConfig) -> ExporterResult<Self> {
        let mut base_url = Url::parse(&config.base_url)
            .map_err(|e| ExporterError::config(format!("Invalid API address: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ExporterError::config(format!(
                "API address must begin with http:// or https://, got {}",
                config.base_url
            )));
        }
        // Url::join replaces the last path segment unless it ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut default_headers = header::HeaderMap::new();
        let mut auth_value = header::HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|e| ExporterError::config(format!("Invalid API token: {e}")))?;
        auth_value.set_sensitive(true);
        default_headers.insert(header::AUTHORIZATION, auth_value);
        default_headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        if config.allow_insecure_connections {
            warn!("TLS certificate verification is disabled for the Brigade API client");
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(format!("brigade-metrics/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(default_headers)
            .danger_accept_invalid_certs(config.allow_insecure_connections)
            .build()
            .map_err(|e| ExporterError::config(format!("Failed to build HTTP client: {e}")))?;

        debug!(base_url = %base_url, timeout_ms = config.timeout_ms, "Brigade API client created");

        Ok(Self {
            client,
            base_url,
            timeout_ms: config.timeout_ms,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> ExporterResult<T> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ExporterError::upstream(operation, format!("invalid path {path}: {e}")))?;

        debug!(operation, url = %url, "Requesting Brigade API");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ExporterError::upstream(operation, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExporterError::upstream(
                operation,
                describe_failure(status, &body),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ExporterError::upstream(operation, format!("invalid response body: {e}")))
    }
}

fn list_query(options: &ListOptions) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(token) = options.continue_token.as_deref().filter(|t| !t.is_empty()) {
        query.push(("continue", token.to_string()));
    }
    if let Some(limit) = options.limit {
        query.push(("limit", limit.to_string()));
    }
    query
}

fn describe_failure(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {body}")
    }
}

#[async_trait]
impl OrchestratorApi for BrigadeApiClient {
    async fn count_running_jobs(&self) -> ExporterResult<SubstrateJobCount> {
        self.get_json("count_running_jobs", api_paths::RUNNING_JOBS_COUNT, &[])
            .await
    }

    async fn list_events(
        &self,
        worker_phases: &[WorkerPhase],
        options: &ListOptions,
    ) -> ExporterResult<EventPage> {
        let mut query = list_query(options);
        if !worker_phases.is_empty() {
            let phases: Vec<&str> = worker_phases.iter().map(WorkerPhase::as_str).collect();
            query.push(("workerPhases", phases.join(",")));
        }
        self.get_json("list_events", api_paths::EVENTS, &query).await
    }

    async fn list_users(&self, options: &ListOptions) -> ExporterResult<CountOnlyPage> {
        self.get_json("list_users", api_paths::USERS, &list_query(options))
            .await
    }

    async fn list_service_accounts(
        &self,
        options: &ListOptions,
    ) -> ExporterResult<CountOnlyPage> {
        self.get_json(
            "list_service_accounts",
            api_paths::SERVICE_ACCOUNTS,
            &list_query(options),
        )
        .await
    }

    async fn list_projects(&self, options: &ListOptions) -> ExporterResult<CountOnlyPage> {
        self.get_json("list_projects", api_paths::PROJECTS, &list_query(options))
            .await
    }
}
