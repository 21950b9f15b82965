//! Feature domain: schema, standardization statistics and the builder that
//! turns loosely structured patient records into classifier rows.

pub mod domain;
pub mod repo_fs;
pub mod service;

pub use domain::{
    ClinicalRecord, ExpandedRecord, FeatureSchema, FeatureVector, StandardizationTable, ZStat,
};
