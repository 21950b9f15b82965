//! Filesystem loading for the Feature Schema and Standardization Table.

use std::path::Path;

use crate::common::error::RiskResult;
use crate::common::json::read_json;

use super::domain::{FeatureSchema, StandardizationTable};

/// Load the schema from a flat JSON array of names.
///
/// A missing file falls back to [`FeatureSchema::builtin`].
pub fn load_schema(path: &Path) -> RiskResult<FeatureSchema> {
    match read_json::<Vec<String>>(path)? {
        Some(names) => FeatureSchema::new(names),
        None => {
            log::warn!(
                "feature schema {} not found, using built-in layout",
                path.display()
            );
            Ok(FeatureSchema::builtin())
        }
    }
}

/// Load the statistics table from a JSON object of `{name: {mean, std}}`.
///
/// A missing file yields an empty table, so every z-score is 0.0.
pub fn load_stats(path: &Path) -> RiskResult<StandardizationTable> {
    match read_json::<StandardizationTable>(path)? {
        Some(table) => Ok(table),
        None => {
            log::warn!(
                "standardization table {} not found, z-scores default to 0.0",
                path.display()
            );
            Ok(StandardizationTable::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::common::error::{RiskCode, RiskError};

    #[test]
    fn schema_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.json");
        fs::write(&path, r#"["date", "age", "age_z"]"#).unwrap();

        let schema = load_schema(&path).unwrap();
        assert_eq!(schema.names(), ["date", "age", "age_z"]);
    }

    #[test]
    fn missing_files_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let schema = load_schema(&dir.path().join("nope.json")).unwrap();
        assert_eq!(schema.len(), FeatureSchema::builtin().len());
        assert!(load_stats(&dir.path().join("nope.json")).unwrap().is_empty());
    }

    #[test]
    fn malformed_files_are_startup_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.json");
        fs::write(&path, r#"{"age": 1}"#).unwrap();
        let err = load_schema(&path).unwrap_err();
        assert_eq!(err.code(), RiskCode::InvalidArtefact);

        fs::write(&path, r#"["age", "age"]"#).unwrap();
        assert!(matches!(load_schema(&path), Err(RiskError::InvalidSchema(_))));
    }

    #[test]
    fn stats_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zscore_stats.json");
        fs::write(&path, r#"{"age": {"mean": 60, "std": 10}}"#).unwrap();
        let table = load_stats(&path).unwrap();
        assert_eq!(table.zscore("age", Some(80.0)), 2.0);
    }
}
