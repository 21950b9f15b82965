//! Explanation domain: global feature importance and per-patient
//! attribution. Deterministic and model-agnostic; nothing here is learned.

pub mod domain;
pub mod service;

pub use domain::{Attribution, Direction, Explanation, FeatureWeight, ImportanceSource};
