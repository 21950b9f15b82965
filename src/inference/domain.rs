//! Risk Classifier Adapter and the results it produces.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::common::error::{RiskError, RiskResult};
use crate::explain::domain::Attribution;
use crate::model::domain::Classifier;

/// Scores strictly above this are `High`.
pub const HIGH_ABOVE: f64 = 0.70;
/// Scores strictly above this (and not `High`) are `Medium`.
pub const MEDIUM_ABOVE: f64 = 0.40;

/// Discrete bucket derived from the continuous risk score.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    /// Bucket an unrounded probability.
    pub fn from_probability(p: f64) -> Self {
        if p > HIGH_ABOVE {
            RiskCategory::High
        } else if p > MEDIUM_ABOVE {
            RiskCategory::Medium
        } else {
            RiskCategory::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Low => "Low",
            RiskCategory::Medium => "Medium",
            RiskCategory::High => "High",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one `predict` call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Probability in [0, 1], rounded to two decimals.
    pub risk_score: f64,
    /// Category of the unrounded probability.
    pub risk_category: RiskCategory,
    pub missing_features: Vec<String>,
}

/// Prediction and attribution for the same record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    #[serde(flatten)]
    pub prediction: Prediction,
    pub attributions: Vec<Attribution>,
}

/// Wraps a pretrained classifier and turns its output into a probability.
#[derive(Clone, Debug)]
pub struct RiskClassifier {
    model: Arc<dyn Classifier>,
}

impl RiskClassifier {
    pub fn new<C: Classifier + 'static>(model: C) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    pub fn model(&self) -> &dyn Classifier {
        self.model.as_ref()
    }

    /// Positive-class probability in [0, 1].
    ///
    /// Both output kinds are clamped into range. A non-finite output fails
    /// with [`RiskError::NonFiniteOutput`]; other invocation failures
    /// propagate unchanged.
    pub fn probability(&self, features: &[f64]) -> RiskResult<f64> {
        let raw = self.model.infer(features)?;
        if !raw.is_finite() {
            return Err(RiskError::NonFiniteOutput(raw));
        }
        Ok(raw.clamp(0.0, 1.0))
    }

    /// Reported score and category. Thresholds see the unrounded value.
    pub fn score(&self, features: &[f64]) -> RiskResult<(f64, RiskCategory)> {
        let p = self.probability(features)?;
        Ok((round_to(p, 2), RiskCategory::from_probability(p)))
    }
}

/// Round to `decimals` places, ties to even (0.125 reports as 0.12).
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
