use std::collections::{BTreeMap, BTreeSet};

use super::store::LabelKey;

/// Values of one gauge family at the time of a snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FamilySnapshot {
    pub help: String,
    pub labels: Vec<String>,
    /// Scalar gauges hold a single sample under the empty key
    pub samples: BTreeMap<LabelKey, f64>,
}

/// Point-in-time copy of every gauge in a [`GaugeStore`](super::GaugeStore)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GaugeSnapshot {
    families: BTreeMap<String, FamilySnapshot>,
}

impl GaugeSnapshot {
    pub(crate) fn new(families: BTreeMap<String, FamilySnapshot>) -> Self {
        Self { families }
    }

    pub fn family(&self, metric: &str) -> Option<&FamilySnapshot> {
        self.families.get(metric)
    }

    pub fn families(&self) -> impl Iterator<Item = (&str, &FamilySnapshot)> {
        self.families
            .iter()
            .map(|(name, family)| (name.as_str(), family))
    }

    /// Value of an unlabeled gauge
    pub fn scalar(&self, metric: &str) -> Option<f64> {
        self.get(metric, &LabelKey::new(Vec::<String>::new()))
    }

    /// Value of one series of a labeled gauge
    pub fn get(&self, metric: &str, key: &LabelKey) -> Option<f64> {
        self.family(metric)
            .and_then(|family| family.samples.get(key))
            .copied()
    }

    /// Label keys present in a family; empty when the family has no series
    pub fn label_keys(&self, metric: &str) -> BTreeSet<LabelKey> {
        self.family(metric)
            .map(|family| family.samples.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Sum of every series of a family
    pub fn sum(&self, metric: &str) -> f64 {
        self.family(metric)
            .map(|family| family.samples.values().sum())
            .unwrap_or(0.0)
    }
}
