//! Inference domain: the Risk Classifier Adapter and the scoring entry
//! points built on it.

pub mod domain;
pub mod service;
pub mod workers;

pub use domain::{Assessment, Prediction, RiskCategory, RiskClassifier};
