//! # Gauge Store
//!
//! Thread-safe owner of every published gauge.
//!
//! The store is written by the aggregation pass and read by the exposition
//! handler on every scrape request. Each family is a prometheus `Gauge` or
//! `GaugeVec`, so individual writes are atomic and a reader always observes
//! a value from before or after a write, never a partial one.
//!
//! ```ignore
//! let store = GaugeStore::new()?;
//! let writer = store.clone();
//!
//! writer.set_scalar(metrics::USERS_TOTAL, 12.0)?;
//! writer.set_labeled(metrics::RUNNING_WORKERS_DURATION, &LabelKey::single("evt-1"), 42.5)?;
//!
//! let text = store.render()?;
//! ```

use prometheus::core::Collector;
use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::catalogue::{GaugeDef, CATALOGUE};
use super::snapshot::{FamilySnapshot, GaugeSnapshot};
use crate::error::{ExporterError, ExporterResult};

/// Ordered label values identifying one series within a labeled family
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelKey(Vec<String>);

impl LabelKey {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(values.into_iter().map(Into::into).collect())
    }

    pub fn single(value: impl Into<String>) -> Self {
        Self(vec![value.into()])
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    fn as_strs(&self) -> Vec<&str> {
        self.0.iter().map(String::as_str).collect()
    }
}

impl fmt::Display for LabelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.0.join(","))
    }
}

impl From<&str> for LabelKey {
    fn from(value: &str) -> Self {
        Self::single(value)
    }
}

impl From<String> for LabelKey {
    fn from(value: String) -> Self {
        Self::single(value)
    }
}

enum Family {
    Scalar(Gauge),
    Labeled {
        vec: GaugeVec,
        labels: &'static [&'static str],
    },
}

struct StoreInner {
    registry: Registry,
    families: HashMap<&'static str, Family>,
}

/// Explicitly constructed gauge registry shared between the aggregation pass
/// and the exposition endpoint. Cloning yields another handle to the same
/// gauges.
#[derive(Clone)]
pub struct GaugeStore {
    inner: Arc<StoreInner>,
}

impl fmt::Debug for GaugeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GaugeStore")
            .field("families", &self.inner.families.len())
            .finish()
    }
}

impl GaugeStore {
    /// Create a store with every family of the standard catalogue registered
    pub fn new() -> ExporterResult<Self> {
        Self::with_catalogue(CATALOGUE)
    }

    /// Create a store with an explicit set of gauge families
    pub fn with_catalogue(defs: &[GaugeDef]) -> ExporterResult<Self> {
        let registry = Registry::new();
        let mut families = HashMap::with_capacity(defs.len());

        for def in defs {
            let opts = Opts::new(def.name, def.help);
            let family = if def.is_scalar() {
                let gauge = Gauge::with_opts(opts)?;
                registry.register(Box::new(gauge.clone()))?;
                Family::Scalar(gauge)
            } else {
                let vec = GaugeVec::new(opts, def.labels)?;
                registry.register(Box::new(vec.clone()))?;
                Family::Labeled {
                    vec,
                    labels: def.labels,
                }
            };
            families.insert(def.name, family);
        }

        debug!(families = families.len(), "Gauge store initialized");

        Ok(Self {
            inner: Arc::new(StoreInner { registry, families }),
        })
    }

    /// Overwrite the value of an unlabeled gauge
    pub fn set_scalar(&self, metric: &str, value: f64) -> ExporterResult<()> {
        match self.family(metric)? {
            Family::Scalar(gauge) => {
                gauge.set(value);
                Ok(())
            }
            Family::Labeled { labels, .. } => Err(ExporterError::LabelArity {
                metric: metric.to_string(),
                expected: labels.len(),
                actual: 0,
            }),
        }
    }

    /// Overwrite or create the value of one series in a labeled family
    pub fn set_labeled(&self, metric: &str, key: &LabelKey, value: f64) -> ExporterResult<()> {
        let vec = self.labeled(metric, key)?;
        vec.with_label_values(&key.as_strs()).set(value);
        Ok(())
    }

    /// Remove one series from a labeled family
    ///
    /// Returns whether the series existed. Deleting an absent key is a no-op.
    pub fn delete_labeled(&self, metric: &str, key: &LabelKey) -> ExporterResult<bool> {
        let vec = self.labeled(metric, key)?;
        Ok(vec.remove_label_values(&key.as_strs()).is_ok())
    }

    /// Label keys currently present in a labeled family
    pub fn label_keys(&self, metric: &str) -> ExporterResult<BTreeSet<LabelKey>> {
        let (vec, labels) = match self.family(metric)? {
            Family::Labeled { vec, labels } => (vec, *labels),
            Family::Scalar(_) => return Ok(BTreeSet::new()),
        };

        Ok(vec
            .collect()
            .iter()
            .flat_map(|family| family.get_metric())
            .map(|sample| key_from_pairs(labels, sample.get_label()))
            .collect())
    }

    /// Delete every series of a labeled family whose key is not in `keep`
    ///
    /// Returns the number of series removed.
    pub fn retain_labeled(&self, metric: &str, keep: &BTreeSet<LabelKey>) -> ExporterResult<usize> {
        let mut removed = 0;
        for key in self.label_keys(metric)? {
            if !keep.contains(&key) && self.delete_labeled(metric, &key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Point-in-time view of every gauge
    pub fn snapshot(&self) -> GaugeSnapshot {
        let mut families = BTreeMap::new();

        for family in self.inner.registry.gather() {
            let name = family.get_name().to_string();
            let labels: Vec<&str> = match self.inner.families.get(name.as_str()) {
                Some(Family::Labeled { labels, .. }) => labels.to_vec(),
                _ => Vec::new(),
            };

            let samples = family
                .get_metric()
                .iter()
                .map(|sample| {
                    (
                        key_from_pairs(&labels, sample.get_label()),
                        sample.get_gauge().get_value(),
                    )
                })
                .collect();

            families.insert(
                name,
                FamilySnapshot {
                    help: family.get_help().to_string(),
                    labels: labels.iter().map(|label| label.to_string()).collect(),
                    samples,
                },
            );
        }

        GaugeSnapshot::new(families)
    }

    /// Encode the current gauges in the Prometheus text exposition format
    pub fn render(&self) -> ExporterResult<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.inner.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| ExporterError::Registry(prometheus::Error::Msg(e.to_string())))
    }

    /// Content type of [`GaugeStore::render`] output
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    fn family(&self, metric: &str) -> ExporterResult<&Family> {
        self.inner
            .families
            .get(metric)
            .ok_or_else(|| ExporterError::UnknownMetric(metric.to_string()))
    }

    fn labeled(&self, metric: &str, key: &LabelKey) -> ExporterResult<&GaugeVec> {
        match self.family(metric)? {
            Family::Labeled { vec, labels } if labels.len() == key.values().len() => Ok(vec),
            Family::Labeled { labels, .. } => Err(ExporterError::LabelArity {
                metric: metric.to_string(),
                expected: labels.len(),
                actual: key.values().len(),
            }),
            Family::Scalar(_) => Err(ExporterError::LabelArity {
                metric: metric.to_string(),
                expected: 0,
                actual: key.values().len(),
            }),
        }
    }
}

// Encoded label pairs are sorted by name; rebuild the declared order.
fn key_from_pairs(labels: &[&str], pairs: &[prometheus::proto::LabelPair]) -> LabelKey {
    LabelKey::new(labels.iter().map(|name| {
        pairs
            .iter()
            .find(|pair| pair.get_name() == *name)
            .map(|pair| pair.get_value().to_string())
            .unwrap_or_default()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::metrics;

    #[test]
    fn test_set_and_overwrite_scalar() {
        let store = GaugeStore::new().unwrap();
        store.set_scalar(metrics::USERS_TOTAL, 3.0).unwrap();
        store.set_scalar(metrics::USERS_TOTAL, 5.0).unwrap();

        assert_eq!(store.snapshot().scalar(metrics::USERS_TOTAL), Some(5.0));
    }

    #[test]
    fn test_labeled_values_are_independent() {
        let store = GaugeStore::new().unwrap();
        let a = LabelKey::single("evt-a");
        let b = LabelKey::single("evt-b");

        store
            .set_labeled(metrics::RUNNING_WORKERS_DURATION, &a, 1.5)
            .unwrap();
        store
            .set_labeled(metrics::RUNNING_WORKERS_DURATION, &b, 2.5)
            .unwrap();
        assert!(store
            .delete_labeled(metrics::RUNNING_WORKERS_DURATION, &a)
            .unwrap());

        let snapshot = store.snapshot();
        assert_eq!(snapshot.get(metrics::RUNNING_WORKERS_DURATION, &a), None);
        assert_eq!(
            snapshot.get(metrics::RUNNING_WORKERS_DURATION, &b),
            Some(2.5)
        );
    }

    #[test]
    fn test_delete_absent_key_is_noop() {
        let store = GaugeStore::new().unwrap();
        let removed = store
            .delete_labeled(metrics::RUNNING_WORKERS_DURATION, &"missing".into())
            .unwrap();
        assert!(!removed);
    }

    #[test]
    fn test_composite_keys_keep_declared_order() {
        let store = GaugeStore::new().unwrap();
        let key = LabelKey::new(["evt-1", "build"]);
        store
            .set_labeled(metrics::RUNNING_JOBS_DURATION, &key, 7.0)
            .unwrap();

        let keys = store.label_keys(metrics::RUNNING_JOBS_DURATION).unwrap();
        assert_eq!(keys.into_iter().collect::<Vec<_>>(), vec![key]);
    }

    #[test]
    fn test_retain_prunes_everything_outside_keep_set() {
        let store = GaugeStore::new().unwrap();
        for id in ["a", "b", "c"] {
            store
                .set_labeled(metrics::RUNNING_WORKERS_DURATION, &id.into(), 1.0)
                .unwrap();
        }

        let keep: BTreeSet<LabelKey> = [LabelKey::single("b")].into_iter().collect();
        let removed = store
            .retain_labeled(metrics::RUNNING_WORKERS_DURATION, &keep)
            .unwrap();

        assert_eq!(removed, 2);
        assert_eq!(
            store.label_keys(metrics::RUNNING_WORKERS_DURATION).unwrap(),
            keep
        );

        let removed = store
            .retain_labeled(metrics::RUNNING_WORKERS_DURATION, &BTreeSet::new())
            .unwrap();
        assert_eq!(removed, 1);
    }

    #[test]
    fn test_misuse_is_reported_not_panicked() {
        let store = GaugeStore::new().unwrap();
        assert!(matches!(
            store.set_scalar("brigade_nope", 1.0),
            Err(ExporterError::UnknownMetric(_))
        ));
        assert!(matches!(
            store.set_labeled(metrics::RUNNING_JOBS_DURATION, &"only-one".into(), 1.0),
            Err(ExporterError::LabelArity {
                expected: 2,
                actual: 1,
                ..
            })
        ));
        assert!(matches!(
            store.set_scalar(metrics::WORKERS_BY_PHASE, 1.0),
            Err(ExporterError::LabelArity { .. })
        ));
    }

    #[test]
    fn test_render_text_format() {
        let store = GaugeStore::new().unwrap();
        store.set_scalar(metrics::RUNNING_JOBS_TOTAL, 4.0).unwrap();
        store
            .set_labeled(metrics::WORKERS_BY_PHASE, &"RUNNING".into(), 2.0)
            .unwrap();

        let text = store.render().unwrap();
        assert!(text.contains("# TYPE brigade_running_jobs_total gauge"));
        assert!(text.contains("brigade_running_jobs_total 4"));
        assert!(text.contains("brigade_all_workers_by_phase{workerPhase=\"RUNNING\"} 2"));
        assert!(store.content_type().starts_with("text/plain"));
    }

    #[test]
    fn test_clones_share_state() {
        let store = GaugeStore::new().unwrap();
        let writer = store.clone();
        writer.set_scalar(metrics::PROJECTS_TOTAL, 9.0).unwrap();
        assert_eq!(store.snapshot().scalar(metrics::PROJECTS_TOTAL), Some(9.0));
    }
}
