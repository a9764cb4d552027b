//! # Exporter Error Types
//!
//! Unified error handling for the scrape, aggregation and exposition paths.
//!
//! Only [`ExporterError::Configuration`] is fatal, and only at startup. Every
//! other variant is logged by the component that observes it and degrades
//! metric freshness instead of stopping the exporter.

use thiserror::Error;

/// Exporter operation result type
pub type ExporterResult<T> = Result<T, ExporterError>;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A sub-query to the remote API failed. Gauges fed by it keep their
    /// last-known values until the next successful cycle.
    #[error("Upstream unavailable during {operation}: {reason}")]
    UpstreamUnavailable { operation: String, reason: String },

    /// An entity returned by the remote API violates an expected invariant.
    /// The entity is skipped.
    #[error("Data integrity fault in {entity}: {reason}")]
    DataIntegrity { entity: String, reason: String },

    /// A listing stopped at the page cap before the upstream was exhausted
    #[error("Listing truncated after {pages} pages: {transferred} transferred, {remaining} remaining")]
    TruncatedListing {
        pages: u32,
        transferred: usize,
        remaining: u64,
    },

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Metric {metric} expects {expected} label values, got {actual}")]
    LabelArity {
        metric: String,
        expected: usize,
        actual: usize,
    },

    #[error("Metrics registry error: {0}")]
    Registry(#[from] prometheus::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExporterError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an upstream error for the named remote operation
    pub fn upstream(operation: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::UpstreamUnavailable {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a data integrity error for a single entity
    pub fn integrity(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataIntegrity {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    /// Whether the next scrape cycle can be expected to clear this error
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExporterError::UpstreamUnavailable { .. } | ExporterError::DataIntegrity { .. }
        )
    }
}

impl From<config::ConfigError> for ExporterError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(ExporterError::upstream("list_users", "connection refused").is_recoverable());
        assert!(ExporterError::integrity("worker abc", "missing start").is_recoverable());
        assert!(!ExporterError::config("API_TOKEN is required").is_recoverable());
        let truncated = ExporterError::TruncatedListing {
            pages: 100,
            transferred: 200,
            remaining: 17,
        };
        assert!(!truncated.is_recoverable());
        assert!(truncated.to_string().contains("17 remaining"));
        assert!(!ExporterError::UnknownMetric("nope".into()).is_recoverable());
    }

    #[test]
    fn test_display_includes_context() {
        let err = ExporterError::upstream("count_running_jobs", "503 Service Unavailable");
        assert_eq!(
            err.to_string(),
            "Upstream unavailable during count_running_jobs: 503 Service Unavailable"
        );

        let err = ExporterError::LabelArity {
            metric: "brigade_all_running_jobs_duration".into(),
            expected: 2,
            actual: 1,
        };
        assert!(err.to_string().contains("expects 2 label values, got 1"));
    }
}
