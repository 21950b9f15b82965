// lib.rs - orchestrator for the clinical risk core
pub mod common;
pub mod context;
pub mod explain;
pub mod features;
pub mod inference;
pub mod model;

pub use common::{RiskCode, RiskError, RiskResult};
pub use context::RiskContext;
pub use explain::service::{explain_patient, global_feature_importance, top_importances};
pub use explain::{Attribution, Direction, Explanation, FeatureWeight};
pub use features::{ClinicalRecord, FeatureSchema, StandardizationTable, ZStat};
pub use inference::service::{assess, batch_predict, predict};
pub use inference::workers::Pool;
pub use inference::{Assessment, Prediction, RiskCategory};
