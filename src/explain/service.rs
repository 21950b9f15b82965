//! Attribution Engine: global importance ranking and per-patient
//! importance-weighted contributions.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::context::RiskContext;
use crate::features::domain::{
    zscore_name, ClinicalRecord, FeatureSchema, FeatureVector, Z_SUFFIX,
};
use crate::features::service::build_vector;
use crate::inference::domain::round_to;
use crate::model::domain::Classifier;

use super::domain::{
    Attribution, Direction, Explanation, FeatureWeight, ImportanceSource, HEURISTIC_FEATURES,
    HEURISTIC_PRIMARY, HEURISTIC_SECONDARY,
};

/// Decide once whether the model ships its own importances.
pub fn resolve_source(model: &dyn Classifier) -> ImportanceSource {
    match model.feature_importances() {
        Some(importances) => ImportanceSource::Native(importances.to_vec()),
        None => ImportanceSource::Heuristic,
    }
}

/// Normalized, descending global ranking over every schema feature.
///
/// Native importances are matched to schema positions; positions without
/// one weigh 0. Weights are absolute values divided by their sum (1.0 when
/// the sum is zero).
pub fn rank_importance(schema: &FeatureSchema, source: &ImportanceSource) -> Vec<FeatureWeight> {
    let raw: Vec<f64> = match source {
        ImportanceSource::Native(values) => (0..schema.len())
            .map(|pos| values.get(pos).copied().unwrap_or(0.0).abs())
            .collect(),
        ImportanceSource::Heuristic => schema
            .names()
            .iter()
            .map(|name| {
                if HEURISTIC_FEATURES.contains(&name.as_str()) {
                    HEURISTIC_PRIMARY
                } else {
                    HEURISTIC_SECONDARY
                }
            })
            .collect(),
    };

    let total: f64 = raw.iter().sum();
    let total = if total == 0.0 { 1.0 } else { total };

    let mut ranking: Vec<FeatureWeight> = schema
        .names()
        .iter()
        .zip(raw)
        .map(|(name, weight)| FeatureWeight {
            feature: name.clone(),
            importance: weight / total,
        })
        .collect();
    ranking.sort_by(|a, b| descending(a.importance, b.importance));
    ranking
}

/// The ranking computed when the context was built.
pub fn global_feature_importance(ctx: &RiskContext) -> &[FeatureWeight] {
    ctx.importance()
}

/// First `n` ranking entries with weights rounded to four decimals.
pub fn top_importances(ctx: &RiskContext, n: usize) -> Vec<FeatureWeight> {
    ctx.importance()
        .iter()
        .take(n)
        .map(|w| FeatureWeight {
            feature: w.feature.clone(),
            importance: round_to(w.importance, 4),
        })
        .collect()
}

/// Rank the features that pushed this record's prediction the most.
pub fn explain_patient(ctx: &RiskContext, record: &ClinicalRecord, top_k: usize) -> Explanation {
    let vector = build_vector(ctx.schema(), ctx.stats(), record);
    explain_vector(ctx.schema(), &vector, ctx.importance(), top_k)
}

/// Attribution over an already projected row.
///
/// Base features use their z-scored counterpart's value when the schema has
/// one. At most `top_k` (floored at 1) non-zero contributions are returned;
/// when every contribution is zero a single zero entry is returned.
pub fn explain_vector(
    schema: &FeatureSchema,
    vector: &FeatureVector,
    importance: &[FeatureWeight],
    top_k: usize,
) -> Explanation {
    let weights: HashMap<&str, f64> = importance
        .iter()
        .map(|w| (w.feature.as_str(), w.importance))
        .collect();

    let mut contributions: Vec<(&str, f64)> = schema
        .names()
        .iter()
        .enumerate()
        .map(|(pos, name)| {
            let value = standardized_position(schema, name)
                .and_then(|z_pos| vector.values.get(z_pos))
                .or_else(|| vector.values.get(pos))
                .copied()
                .unwrap_or(0.0);
            let weight = weights.get(name.as_str()).copied().unwrap_or(0.0);
            (name.as_str(), value * weight)
        })
        .collect();
    contributions.sort_by(|a, b| descending(a.1.abs(), b.1.abs()));

    let k = top_k.max(1);
    let mut top: Vec<(&str, f64)> = contributions
        .iter()
        .filter(|(_, c)| *c != 0.0)
        .take(k)
        .copied()
        .collect();
    if top.is_empty() {
        top.extend(contributions.first().copied());
    }

    Explanation {
        attributions: top
            .into_iter()
            .map(|(feature, c)| Attribution {
                feature: feature.to_string(),
                direction: Direction::of(c),
                magnitude: round_to(c.abs(), 3),
            })
            .collect(),
    }
}

fn standardized_position(schema: &FeatureSchema, name: &str) -> Option<usize> {
    if name.ends_with(Z_SUFFIX) {
        return None;
    }
    schema.position(&zscore_name(name))
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
