use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::DatasetId;

/// Named KPI values computed for one dataset. Replaced wholesale on re-analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    pub dataset_id: DatasetId,
    pub metrics: IndexMap<String, f64>,
}

impl KpiSet {
    pub fn new(dataset_id: DatasetId) -> Self {
        Self {
            dataset_id,
            metrics: IndexMap::new(),
        }
    }

    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.metrics.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
