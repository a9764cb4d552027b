//! Exporter Web Handlers

pub mod health;
pub mod metrics;
