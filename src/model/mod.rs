//! Model domain: pretrained classifier artefacts and their loader.

pub mod domain;
mod math;
pub mod repo_fs;

pub use domain::{Classifier, ForestModel, LinearModel, ModelArtefact, OutputKind};
