//! Feature Schema, Standardization Table and the record types flowing
//! through the vector builder.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::common::error::{RiskError, RiskResult};

/// Positional filler slot; always projected as 0.0.
pub const DATE: &str = "date";
/// Days since 1970-01-01 derived from [`DATE`].
pub const DAY_INDEX: &str = "day_index";
/// Suffix marking the standardized counterpart of a base feature.
pub const Z_SUFFIX: &str = "_z";

/// Continuous vitals and laboratory means.
pub const VITALS_AND_LABS: [&str; 15] = [
    "heartrate_mean",
    "resp_rate_mean",
    "spo2_mean",
    "temp_mean",
    "sbp_mean",
    "dbp_mean",
    "glucose_mean",
    "creatinine_mean",
    "wbc_mean",
    "hemoglobin_mean",
    "platelets_mean",
    "sodium_mean",
    "potassium_mean",
    "lactate_mean",
    "bun_mean",
];

/// Comorbidity indicators, usually supplied as yes/no tokens.
pub const COMORBIDITY_FLAGS: [&str; 8] = [
    "diabetes",
    "hypertension",
    "copd",
    "ckd",
    "chf",
    "cad",
    "asthma",
    "cancer",
];

/// Every raw measurement or flag read from a compact record, in schema order.
pub fn base_features() -> impl Iterator<Item = &'static str> {
    ["age", "gender"]
        .into_iter()
        .chain(VITALS_AND_LABS)
        .chain(COMORBIDITY_FLAGS)
}

/// Base features that carry a z-scored counterpart.
pub fn standardizable_features() -> impl Iterator<Item = &'static str> {
    std::iter::once("age").chain(VITALS_AND_LABS)
}

/// Name of the standardized counterpart of `base`.
pub fn zscore_name(base: &str) -> String {
    format!("{base}{Z_SUFFIX}")
}

/// Ordered, duplicate-free list of feature names defining the classifier input.
#[derive(Clone, Debug)]
pub struct FeatureSchema {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Build a schema, rejecting empty lists and duplicate names.
    pub fn new(names: Vec<String>) -> RiskResult<Self> {
        if names.is_empty() {
            return Err(RiskError::InvalidSchema("feature list is empty".into()));
        }

        let mut index = HashMap::with_capacity(names.len());
        for (pos, name) in names.iter().enumerate() {
            if index.insert(name.clone(), pos).is_some() {
                return Err(RiskError::InvalidSchema(format!(
                    "duplicate feature `{name}`"
                )));
            }
        }

        Ok(Self { names, index })
    }

    /// The schema the bundled model family was trained with.
    pub fn builtin() -> Self {
        let names: Vec<String> = [DATE, DAY_INDEX]
            .into_iter()
            .map(str::to_string)
            .chain(base_features().map(str::to_string))
            .chain(standardizable_features().map(zscore_name))
            .collect();
        let index = names
            .iter()
            .enumerate()
            .map(|(pos, name)| (name.clone(), pos))
            .collect();
        Self { names, index }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Schema names accepted by `keep`, in schema order.
    pub(crate) fn retain_ordered<F>(&self, keep: F) -> Vec<String>
    where
        F: Fn(&str) -> bool,
    {
        self.names
            .iter()
            .filter(|name| keep(name.as_str()))
            .cloned()
            .collect()
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Population statistics for one base feature.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZStat {
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub std: Option<f64>,
}

impl ZStat {
    pub fn new(mean: f64, std: f64) -> Self {
        Self {
            mean: Some(mean),
            std: Some(std),
        }
    }

    /// Standardize `value`; a zero or absent std counts as 1.0.
    pub fn apply(&self, value: f64) -> f64 {
        let std = match self.std {
            Some(std) if std != 0.0 => std,
            _ => 1.0,
        };
        (value - self.mean.unwrap_or(0.0)) / std
    }
}

/// Base feature name to `(mean, std)`, loaded once and shared read-only.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StandardizationTable {
    stats: HashMap<String, ZStat>,
}

impl StandardizationTable {
    pub fn new(stats: HashMap<String, ZStat>) -> Self {
        Self { stats }
    }

    pub fn get(&self, name: &str) -> Option<&ZStat> {
        self.stats.get(name)
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// z-score of `value` for feature `name`.
    ///
    /// Returns 0.0 when the value is absent or the table has no entry.
    pub fn zscore(&self, name: &str, value: Option<f64>) -> f64 {
        match (value, self.stats.get(name)) {
            (Some(v), Some(stat)) => stat.apply(v),
            _ => 0.0,
        }
    }
}

impl FromIterator<(String, ZStat)> for StandardizationTable {
    fn from_iter<I: IntoIterator<Item = (String, ZStat)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Loosely typed patient record: string keys, heterogeneous values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClinicalRecord(Map<String, Value>);

impl ClinicalRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object. Non-object documents are rejected.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

}

impl From<Map<String, Value>> for ClinicalRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ClinicalRecord {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Full feature dictionary produced by expansion.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpandedRecord {
    /// Every schema entry, plus `date` and `day_index`.
    pub features: ClinicalRecord,
    /// Schema entries that were absent or uncoercible, in schema order.
    pub defaulted: Vec<String>,
}

/// Dense numeric row aligned 1:1 with the schema.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureVector {
    pub values: Vec<f64>,
    /// Schema entries that were defaulted to 0.0, in schema order.
    pub missing: Vec<String>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Value projected for `name`, if the schema knows it.
    pub fn value_of(&self, schema: &FeatureSchema, name: &str) -> Option<f64> {
        schema
            .position(name)
            .and_then(|pos| self.values.get(pos).copied())
    }
}
