//! Pretrained classifier artefacts and the trait the adapter talks to.
//!
//! Artefacts are produced offline and shipped as JSON tagged by `kind`. The
//! runtime only performs inference.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::error::{RiskError, RiskResult};

use super::math::{dot, sigmoid};

/// What a classifier's direct output means.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputKind {
    /// Probability mass of the positive class.
    Probability,
    /// Probability-like scalar with no range guarantee.
    Score,
}

/// Read-only inference contract. Implementations must be safe to share
/// across threads.
pub trait Classifier: Send + Sync + fmt::Debug {
    /// Number of inputs the classifier accepts.
    fn input_width(&self) -> usize;

    fn output_kind(&self) -> OutputKind;

    /// Run the classifier on one row.
    fn infer(&self, features: &[f64]) -> RiskResult<f64>;

    /// Native per-feature importances, when the artefact carries them.
    fn feature_importances(&self) -> Option<&[f64]> {
        None
    }

    fn check_width(&self, features: &[f64]) -> RiskResult<()> {
        if features.len() == self.input_width() {
            Ok(())
        } else {
            Err(RiskError::ShapeMismatch {
                expected: self.input_width(),
                got: features.len(),
            })
        }
    }
}

/// Descriptive metadata shared by every artefact kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    #[serde(default)]
    pub model_id: String,
    #[serde(default)]
    pub model_version: String,
    /// Training-time column order, used only for validation.
    #[serde(default)]
    pub feature_names: Vec<String>,
}

/// Weight vector plus intercept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub weights: Vec<f64>,
    #[serde(default)]
    pub bias: f64,
    #[serde(flatten)]
    pub meta: ModelMeta,
}

impl LinearModel {
    fn raw(&self, features: &[f64]) -> f64 {
        dot(&self.weights, features) + self.bias
    }

    fn validate(&self) -> RiskResult<()> {
        if self.weights.is_empty() {
            return Err(RiskError::InvalidModel("weight vector is empty".into()));
        }
        if let Some((index, w)) = self.weights.iter().enumerate().find(|(_, w)| !w.is_finite()) {
            return Err(RiskError::InvalidModel(format!(
                "non-finite weight at index {index}: {w}"
            )));
        }
        if !self.bias.is_finite() {
            return Err(RiskError::InvalidModel(format!(
                "non-finite bias: {}",
                self.bias
            )));
        }
        Ok(())
    }
}

/// One node of a binary decision tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// `x[feature] <= threshold` goes left, everything else right.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Positive-class probability at this leaf.
    Leaf { value: f64 },
}

/// Flat node array; node 0 is the root and children always follow parents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    fn predict(&self, features: &[f64]) -> RiskResult<f64> {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = features.get(*feature).copied().unwrap_or(0.0);
                    idx = if x <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(RiskError::InvalidModel(format!(
                        "tree node {idx} does not exist"
                    )))
                }
            }
        }
    }

    fn validate(&self, n_features: usize) -> RiskResult<()> {
        if self.nodes.is_empty() {
            return Err(RiskError::InvalidModel("tree has no nodes".into()));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(RiskError::InvalidModel(format!(
                            "node {idx} splits on feature {feature}, model has {n_features}"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(RiskError::InvalidModel(format!(
                            "node {idx} has a non-finite threshold"
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(RiskError::InvalidModel(format!(
                                "node {idx} points at invalid child {child}"
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !(0.0..=1.0).contains(value) {
                        return Err(RiskError::InvalidModel(format!(
                            "leaf {idx} probability {value} outside [0, 1]"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Averaged ensemble of probability trees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub n_features: usize,
    pub trees: Vec<Tree>,
    #[serde(default)]
    pub feature_importances: Option<Vec<f64>>,
    #[serde(flatten)]
    pub meta: ModelMeta,
}

impl ForestModel {
    fn predict(&self, features: &[f64]) -> RiskResult<f64> {
        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.predict(features)?;
        }
        Ok(total / self.trees.len() as f64)
    }

    fn validate(&self) -> RiskResult<()> {
        if self.trees.is_empty() {
            return Err(RiskError::InvalidModel("forest has no trees".into()));
        }
        for tree in &self.trees {
            tree.validate(self.n_features)?;
        }
        if let Some(importances) = &self.feature_importances {
            if importances.len() != self.n_features {
                return Err(RiskError::InvalidModel(format!(
                    "{} importances for {} features",
                    importances.len(),
                    self.n_features
                )));
            }
            if importances.iter().any(|v| !v.is_finite()) {
                return Err(RiskError::InvalidModel("non-finite importance".into()));
            }
        }
        Ok(())
    }
}

/// Every artefact kind the loader understands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtefact {
    /// Logistic regression: σ(w·x + b).
    Logistic(LinearModel),
    /// Linear scorer without a probability link: w·x + b.
    Linear(LinearModel),
    /// Tree ensemble averaging leaf probabilities.
    Forest(ForestModel),
}

impl ModelArtefact {
    pub fn meta(&self) -> &ModelMeta {
        match self {
            ModelArtefact::Logistic(m) | ModelArtefact::Linear(m) => &m.meta,
            ModelArtefact::Forest(m) => &m.meta,
        }
    }

    /// Structural checks run once at load time.
    pub fn validate(&self) -> RiskResult<()> {
        match self {
            ModelArtefact::Logistic(m) | ModelArtefact::Linear(m) => m.validate()?,
            ModelArtefact::Forest(m) => m.validate()?,
        }
        let names = &self.meta().feature_names;
        if !names.is_empty() && names.len() != self.input_width() {
            return Err(RiskError::InvalidModel(format!(
                "{} feature names for input width {}",
                names.len(),
                self.input_width()
            )));
        }
        Ok(())
    }
}

impl Classifier for ModelArtefact {
    fn input_width(&self) -> usize {
        match self {
            ModelArtefact::Logistic(m) | ModelArtefact::Linear(m) => m.weights.len(),
            ModelArtefact::Forest(m) => m.n_features,
        }
    }

    fn output_kind(&self) -> OutputKind {
        match self {
            ModelArtefact::Logistic(_) | ModelArtefact::Forest(_) => OutputKind::Probability,
            ModelArtefact::Linear(_) => OutputKind::Score,
        }
    }

    fn infer(&self, features: &[f64]) -> RiskResult<f64> {
        self.check_width(features)?;
        match self {
            ModelArtefact::Logistic(m) => Ok(sigmoid(m.raw(features))),
            ModelArtefact::Linear(m) => Ok(m.raw(features)),
            ModelArtefact::Forest(m) => m.predict(features),
        }
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        match self {
            ModelArtefact::Forest(m) => m.feature_importances.as_deref(),
            ModelArtefact::Logistic(_) | ModelArtefact::Linear(_) => None,
        }
    }
}
