//! Attribution types and the importance source resolved at load time.

use serde::{Deserialize, Serialize};

/// Number of attributions returned when the caller does not ask otherwise.
pub const DEFAULT_TOP_K: usize = 4;

/// Weight given to [`HEURISTIC_FEATURES`] when the model has no importances.
pub const HEURISTIC_PRIMARY: f64 = 1.0;
/// Weight given to every other feature under the heuristic.
pub const HEURISTIC_SECONDARY: f64 = 0.2;

/// Continuous vitals, labs and their z-scores emphasised by the heuristic.
pub const HEURISTIC_FEATURES: [&str; 24] = [
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
    "heartrate_mean",
    "resp_rate_mean",
    "spo2_mean",
    "temp_mean",
    "age_z",
    "sbp_mean_z",
    "dbp_mean_z",
    "glucose_mean_z",
    "bun_mean_z",
    "heartrate_mean_z",
    "resp_rate_mean_z",
    "spo2_mean_z",
    "temp_mean_z",
];

/// Where global importances come from, decided once per loaded model.
#[derive(Clone, Debug, PartialEq)]
pub enum ImportanceSource {
    /// Per-feature importances shipped with the artefact, in input order.
    Native(Vec<f64>),
    /// Fixed weights: [`HEURISTIC_PRIMARY`] for [`HEURISTIC_FEATURES`],
    /// [`HEURISTIC_SECONDARY`] for the rest.
    Heuristic,
}

/// One entry of the global ranking; weights across the ranking sum to 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeight {
    pub feature: String,
    pub importance: f64,
}

/// Sign of a feature's contribution.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn of(contribution: f64) -> Self {
        if contribution >= 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

/// One ranked per-patient contribution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub feature: String,
    pub direction: Direction,
    /// |contribution| rounded to three decimals.
    pub magnitude: f64,
}

/// Result of `explain_patient`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub attributions: Vec<Attribution>,
}
