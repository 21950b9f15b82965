//! Filesystem loading for classifier artefacts.

use std::path::Path;

use log::Level;

use crate::common::error::{RiskError, RiskResult};
use crate::common::json::read_json;
use crate::common::{log as risk_log, time};

use super::domain::{Classifier, ModelArtefact};

/// Load and validate the artefact at `path`.
pub fn load_model(path: &Path) -> RiskResult<ModelArtefact> {
    let start = time::now_ms();
    let model: ModelArtefact =
        read_json(path)?.ok_or_else(|| RiskError::ArtefactMissing(path.to_path_buf()))?;

    if let Err(err) = model.validate() {
        risk_log::log_event(
            Level::Error,
            module_path!(),
            "model_rejected",
            err.code() as u32,
            time::now_ms().saturating_sub(start),
        );
        return Err(err);
    }

    let meta = model.meta();
    log::info!(
        "loaded model {} {} (width {}, {:?})",
        meta.model_id,
        meta.model_version,
        model.input_width(),
        model.output_kind()
    );
    risk_log::log_event(
        Level::Info,
        module_path!(),
        "model_loaded",
        0,
        time::now_ms().saturating_sub(start),
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::common::error::RiskCode;

    #[test]
    fn loads_logistic_artefact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("risk_model.json");
        fs::write(
            &path,
            r#"{"kind": "logistic", "model_version": "2", "weights": [0.5, 0.5], "bias": -1}"#,
        )
        .unwrap();

        let model = load_model(&path).unwrap();
        assert_eq!(model.input_width(), 2);
        assert_eq!(model.meta().model_version, "2");
    }

    #[test]
    fn missing_and_invalid_artefacts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("risk_model.json");
        assert_eq!(
            load_model(&path).unwrap_err().code(),
            RiskCode::ArtefactMissing
        );

        fs::write(&path, r#"{"kind": "svm"}"#).unwrap();
        assert!(matches!(load_model(&path), Err(RiskError::Json { .. })));

        fs::write(&path, r#"{"kind": "linear", "weights": [1e400]}"#).unwrap();
        assert!(load_model(&path).is_err());
    }
}
