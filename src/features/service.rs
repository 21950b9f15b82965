//! Feature Vector Builder: compact or full record → full dictionary →
//! ordered numeric row.
//!
//! Expansion and projection are total. Nothing in here fails; every value
//! that cannot be read is replaced with 0.0 and its name is reported.

use std::collections::HashSet;

use crate::common::json;
use crate::common::time;

use super::domain::{
    base_features, standardizable_features, zscore_name, ClinicalRecord, ExpandedRecord,
    FeatureSchema, FeatureVector, StandardizationTable, DATE, DAY_INDEX,
};

/// Expand `record` into a dictionary covering every schema entry.
///
/// `date` overrides any date carried by the record; without either, today's
/// UTC date is used.
pub fn expand_record(
    schema: &FeatureSchema,
    stats: &StandardizationTable,
    record: &ClinicalRecord,
    date: Option<&str>,
) -> ExpandedRecord {
    let date = date
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .or_else(|| record.get(DATE).and_then(json::scalar_text))
        .unwrap_or_else(time::today_utc);

    let mut full = ClinicalRecord::new();
    let mut defaulted: HashSet<String> = HashSet::new();

    let day_index = record
        .get(DAY_INDEX)
        .and_then(json::as_number)
        .unwrap_or_else(|| time::day_index(&date) as f64);
    full.insert(DAY_INDEX, day_index);
    full.insert(DATE, date);

    let read = |name: &str| record.get(name).and_then(json::as_flag_or_number);

    for base in base_features() {
        let value = read(base);
        if value.is_none() {
            defaulted.insert(base.to_string());
        }
        full.insert(base, value.unwrap_or(0.0));
    }

    // A base without a value standardizes from its 0.0 default.
    for base in standardizable_features() {
        let z_name = zscore_name(base);
        let value = read(&z_name).or_else(|| {
            stats.get(base)?;
            Some(stats.zscore(base, Some(read(base).unwrap_or(0.0))))
        });
        if value.is_none() {
            defaulted.insert(z_name.clone());
        }
        full.insert(z_name, value.unwrap_or(0.0));
    }

    for name in schema.names() {
        if full.contains_key(name) {
            continue;
        }
        let value = read(name);
        if value.is_none() {
            defaulted.insert(name.clone());
        }
        full.insert(name.as_str(), value.unwrap_or(0.0));
    }

    ExpandedRecord {
        features: full,
        defaulted: schema.retain_ordered(|name| defaulted.contains(name)),
    }
}

/// Project a full dictionary onto the schema.
///
/// `date` always projects to 0.0. Every other present value goes through a
/// float cast; failures project to 0.0 and are reported missing.
pub fn project(schema: &FeatureSchema, record: &ClinicalRecord) -> FeatureVector {
    let mut values = Vec::with_capacity(schema.len());
    let mut missing = Vec::new();

    for name in schema.names() {
        let value = match record.get(name) {
            Some(_) if name == DATE => Some(0.0),
            Some(raw) => json::as_number(raw),
            None => None,
        };
        match value {
            Some(v) => values.push(v),
            None => {
                values.push(0.0);
                missing.push(name.clone());
            }
        }
    }

    FeatureVector { values, missing }
}

/// Expand then project, merging both sources of missing names.
pub fn build_vector(
    schema: &FeatureSchema,
    stats: &StandardizationTable,
    record: &ClinicalRecord,
) -> FeatureVector {
    let expanded = expand_record(schema, stats, record, None);
    let mut vector = project(schema, &expanded.features);

    let missing: HashSet<&str> = expanded
        .defaulted
        .iter()
        .chain(vector.missing.iter())
        .map(String::as_str)
        .collect();
    vector.missing = schema.retain_ordered(|name| missing.contains(name));
    vector
}
