//! # Exporter Constants
//!
//! Metric names, label names and configuration keys that make up the
//! externally visible contract of the exporter.

/// Published metric names
pub mod metrics {
    pub const RUNNING_JOBS_TOTAL: &str = "brigade_running_jobs_total";
    pub const PENDING_JOBS_TOTAL: &str = "brigade_pending_jobs_total";
    pub const WORKERS_BY_PHASE: &str = "brigade_all_workers_by_phase";
    pub const JOBS_BY_PHASE: &str = "brigade_all_jobs_by_phase";
    pub const RUNNING_WORKERS_DURATION: &str = "brigade_all_running_workers_duration";
    pub const RUNNING_JOBS_DURATION: &str = "brigade_all_running_jobs_duration";
    pub const RUNNING_WORKERS_BY_PROJECT: &str = "brigade_running_workers_by_project";
    pub const USERS_TOTAL: &str = "brigade_users_total";
    pub const SERVICE_ACCOUNTS_TOTAL: &str = "brigade_service_accounts_total";
    pub const PROJECTS_TOTAL: &str = "brigade_projects_total";

    pub const SCRAPE_DURATION_SECONDS: &str = "brigade_exporter_scrape_duration_seconds";
    pub const SCRAPE_FAILURES: &str = "brigade_exporter_scrape_failures";
    pub const LAST_SCRAPE_TIMESTAMP_SECONDS: &str =
        "brigade_exporter_last_scrape_timestamp_seconds";
}

/// Label dimension names
pub mod labels {
    pub const WORKER: &str = "worker";
    pub const JOB: &str = "job";
    pub const PROJECT_ID: &str = "projectID";
}

/// Environment variables named in startup diagnostics
pub mod env {
    pub const API_ADDRESS: &str = "API_ADDRESS";
    pub const API_TOKEN: &str = "API_TOKEN";
    pub const API_REQUEST_TIMEOUT_MS: &str = "API_REQUEST_TIMEOUT_MS";
    pub const PROM_SCRAPE_INTERVAL: &str = "PROM_SCRAPE_INTERVAL";
    pub const METRICS_BIND_ADDRESS: &str = "METRICS_BIND_ADDRESS";
    pub const MAX_EVENT_PAGES: &str = "MAX_EVENT_PAGES";
    pub const ENVIRONMENT: &str = "BRIGADE_METRICS_ENV";
}

/// Configuration defaults
pub mod defaults {
    pub const SCRAPE_INTERVAL_SECS: u64 = 5;
    pub const METRICS_PORT: u16 = 8080;
    pub const METRICS_BIND_ADDRESS: &str = "0.0.0.0";
    pub const API_IGNORE_CERT_WARNINGS: bool = true;
    pub const API_REQUEST_TIMEOUT_MS: u64 = 30_000;
    pub const MAX_EVENT_PAGES: u32 = 100;
}

/// Remote API paths, relative to the configured base address
pub mod api_paths {
    pub const EVENTS: &str = "v2/events";
    pub const RUNNING_JOBS_COUNT: &str = "v2/substrate/running-jobs-count";
    pub const USERS: &str = "v2/users";
    pub const SERVICE_ACCOUNTS: &str = "v2/service-accounts";
    pub const PROJECTS: &str = "v2/projects";
}
