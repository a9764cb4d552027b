//! # Exporter Configuration
//!
//! Process configuration, layered with the `config` crate.
//!
//! Precedence (highest to lowest):
//! 1. Environment variables (`API_ADDRESS`, `PROM_SCRAPE_INTERVAL`, ...)
//! 2. Optional TOML file, using the same keys in lower case
//! 3. Built-in defaults
//!
//! ```toml
//! api_address = "https://brigade.example.com"
//! api_token = "..."
//! prom_scrape_interval = 10
//! phase_count_strategy = "per_phase"
//! ```

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::aggregator::PhaseCountStrategy;
use crate::client::ApiClientConfig;
use crate::constants::{defaults, env};
use crate::error::{ExporterError, ExporterResult};
use crate::logging::LogFormat;

#[derive(Clone, Deserialize)]
pub struct ExporterConfig {
    /// Base address of the Brigade API server
    #[serde(default)]
    pub api_address: String,
    #[serde(default)]
    pub api_token: String,
    /// Skip TLS certificate verification against the API server
    pub api_ignore_cert_warnings: bool,
    pub api_request_timeout_ms: u64,
    /// Seconds between scrape passes
    pub prom_scrape_interval: u64,
    pub metrics_port: u16,
    pub metrics_bind_address: String,
    #[serde(deserialize_with = "parse_from_str")]
    pub phase_count_strategy: PhaseCountStrategy,
    /// Cap on event pages followed per listing
    pub max_event_pages: u32,
    #[serde(deserialize_with = "parse_from_str")]
    pub log_format: LogFormat,
}

impl fmt::Debug for ExporterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExporterConfig")
            .field("api_address", &self.api_address)
            .field("api_token", &"[REDACTED]")
            .field("api_ignore_cert_warnings", &self.api_ignore_cert_warnings)
            .field("api_request_timeout_ms", &self.api_request_timeout_ms)
            .field("prom_scrape_interval", &self.prom_scrape_interval)
            .field("metrics_port", &self.metrics_port)
            .field("metrics_bind_address", &self.metrics_bind_address)
            .field("phase_count_strategy", &self.phase_count_strategy)
            .field("max_event_pages", &self.max_event_pages)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl ExporterConfig {
    /// Load from the process environment and an optional TOML file, then
    /// validate
    pub fn load(path: Option<&Path>) -> ExporterResult<Self> {
        Self::load_with_env(path, None)
    }

    /// Load using `env` in place of the process environment when given
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> ExporterResult<Self> {
        let mut builder = Config::builder()
            .set_default("api_ignore_cert_warnings", defaults::API_IGNORE_CERT_WARNINGS)?
            .set_default(
                "api_request_timeout_ms",
                defaults::API_REQUEST_TIMEOUT_MS as i64,
            )?
            .set_default("prom_scrape_interval", defaults::SCRAPE_INTERVAL_SECS as i64)?
            .set_default("metrics_port", i64::from(defaults::METRICS_PORT))?
            .set_default("metrics_bind_address", defaults::METRICS_BIND_ADDRESS)?
            .set_default(
                "phase_count_strategy",
                PhaseCountStrategy::default().to_string(),
            )?
            .set_default("max_event_pages", i64::from(defaults::MAX_EVENT_PAGES))?
            .set_default("log_format", LogFormat::default().to_string())?;

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading config file");
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        let config: Self = builder
            .add_source(Environment::default().source(env))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the exporter cannot start with
    pub fn validate(&self) -> ExporterResult<()> {
        if self.api_address.trim().is_empty() {
            return Err(ExporterError::config(format!("{} is required", env::API_ADDRESS)));
        }
        if !(self.api_address.starts_with("http://") || self.api_address.starts_with("https://"))
        {
            return Err(ExporterError::config(format!(
                "{} must begin with http:// or https://, got {}",
                env::API_ADDRESS, self.api_address
            )));
        }
        if self.api_token.trim().is_empty() {
            return Err(ExporterError::config(format!("{} is required", env::API_TOKEN)));
        }
        if self.prom_scrape_interval == 0 {
            return Err(ExporterError::config(format!(
                "{} must be at least 1 second",
                env::PROM_SCRAPE_INTERVAL
            )));
        }
        if self.api_request_timeout_ms == 0 {
            return Err(ExporterError::config(format!(
                "{} must be greater than zero",
                env::API_REQUEST_TIMEOUT_MS
            )));
        }
        if self.max_event_pages == 0 {
            return Err(ExporterError::config(format!(
                "{} must be at least 1",
                env::MAX_EVENT_PAGES
            )));
        }
        self.listen_addr()?;
        Ok(())
    }

    pub fn api_client_config(&self) -> ApiClientConfig {
        ApiClientConfig {
            base_url: self.api_address.clone(),
            token: self.api_token.clone(),
            allow_insecure_connections: self.api_ignore_cert_warnings,
            timeout_ms: self.api_request_timeout_ms,
        }
    }

    pub fn scrape_interval(&self) -> Duration {
        Duration::from_secs(self.prom_scrape_interval)
    }

    /// Socket address the exposition server binds to
    pub fn listen_addr(&self) -> ExporterResult<SocketAddr> {
        let ip: IpAddr = self.metrics_bind_address.parse().map_err(|e| {
            ExporterError::config(format!(
                "{} {} is not an IP address: {e}",
                env::METRICS_BIND_ADDRESS, self.metrics_bind_address
            ))
        })?;
        Ok(SocketAddr::new(ip, self.metrics_port))
    }
}

fn parse_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("API_ADDRESS", "https://brigade.example.com"),
            ("API_TOKEN", "s3cret"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = ExporterConfig::load_with_env(None, env(&required())).unwrap();

        assert!(config.api_ignore_cert_warnings);
        assert_eq!(config.scrape_interval(), Duration::from_secs(5));
        assert_eq!(config.metrics_port, 8080);
        assert_eq!(config.listen_addr().unwrap().to_string(), "0.0.0.0:8080");
        assert_eq!(config.phase_count_strategy, PhaseCountStrategy::Bucketed);
        assert_eq!(config.max_event_pages, 100);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_env_overrides() {
        let mut vars = required();
        vars.extend([
            ("API_IGNORE_CERT_WARNINGS", "false"),
            ("PROM_SCRAPE_INTERVAL", "15"),
            ("METRICS_PORT", "9100"),
            ("PHASE_COUNT_STRATEGY", "PER_PHASE"),
            ("LOG_FORMAT", "json"),
        ]);
        let config = ExporterConfig::load_with_env(None, env(&vars)).unwrap();

        assert!(!config.api_ignore_cert_warnings);
        assert_eq!(config.prom_scrape_interval, 15);
        assert_eq!(config.metrics_port, 9100);
        assert_eq!(config.phase_count_strategy, PhaseCountStrategy::PerPhase);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_missing_required_values_are_fatal() {
        let err = ExporterConfig::load_with_env(None, env(&[("API_TOKEN", "t")])).unwrap_err();
        assert!(err.to_string().contains("API_ADDRESS is required"));

        let err = ExporterConfig::load_with_env(
            None,
            env(&[("API_ADDRESS", "https://brigade.example.com")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("API_TOKEN is required"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut vars = required();
        vars.push(("PROM_SCRAPE_INTERVAL", "0"));
        assert!(ExporterConfig::load_with_env(None, env(&vars)).is_err());

        let mut vars = required();
        vars.push(("PHASE_COUNT_STRATEGY", "both"));
        assert!(ExporterConfig::load_with_env(None, env(&vars)).is_err());

        let vars = [("API_ADDRESS", "brigade.example.com"), ("API_TOKEN", "t")];
        assert!(ExporterConfig::load_with_env(None, env(&vars)).is_err());
    }

    #[test]
    fn test_file_is_overridden_by_env() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
api_address = "https://from-file.example.com"
api_token = "file-token"
prom_scrape_interval = 30
metrics_bind_address = "127.0.0.1"
"#
        )
        .unwrap();

        let config = ExporterConfig::load_with_env(
            Some(file.path()),
            env(&[("PROM_SCRAPE_INTERVAL", "7")]),
        )
        .unwrap();

        assert_eq!(config.api_address, "https://from-file.example.com");
        assert_eq!(config.prom_scrape_interval, 7);
        assert_eq!(config.listen_addr().unwrap().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ExporterConfig::load_with_env(None, env(&required())).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("[REDACTED]"));

        let client = config.api_client_config();
        assert_eq!(client.token, "s3cret");
        assert!(client.allow_insecure_connections);
        assert_eq!(client.timeout_ms, 30_000);
    }

    #[test]
    fn test_validation_errors_name_the_variable() {
        let mut vars = required();
        vars.push(("MAX_EVENT_PAGES", "0"));
        let err = ExporterConfig::load_with_env(None, env(&vars)).unwrap_err();
        assert!(err.to_string().contains(env::MAX_EVENT_PAGES));

        let mut vars = required();
        vars.push(("METRICS_BIND_ADDRESS", "localhost"));
        let err = ExporterConfig::load_with_env(None, env(&vars)).unwrap_err();
        assert!(err.to_string().contains(env::METRICS_BIND_ADDRESS));
    }
}
