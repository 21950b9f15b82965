//! Scoring entry points: single records, combined prediction and
//! explanation, and cohort batches.

use std::sync::mpsc;
use std::sync::Arc;

use log::Level;

use crate::common::error::{RiskError, RiskResult};
use crate::common::{log as risk_log, time};
use crate::context::RiskContext;
use crate::explain::service::explain_vector;
use crate::features::domain::ClinicalRecord;
use crate::features::service::build_vector;

use super::domain::{Assessment, Prediction};
use super::workers::Pool;

/// Score one record.
///
/// Missing or malformed fields never fail; they are defaulted and listed in
/// `missing_features`. Only a classifier that rejects the row fails.
pub fn predict(ctx: &RiskContext, record: &ClinicalRecord) -> RiskResult<Prediction> {
    let vector = build_vector(ctx.schema(), ctx.stats(), record);
    let (risk_score, risk_category) = ctx.classifier().score(vector.as_slice())?;
    Ok(Prediction {
        risk_score,
        risk_category,
        missing_features: vector.missing,
    })
}

/// Score and explain one record from a single expansion.
pub fn assess(ctx: &RiskContext, record: &ClinicalRecord, top_k: usize) -> RiskResult<Assessment> {
    let vector = build_vector(ctx.schema(), ctx.stats(), record);
    let (risk_score, risk_category) = ctx.classifier().score(vector.as_slice())?;
    let explanation = explain_vector(ctx.schema(), &vector, ctx.importance(), top_k);
    Ok(Assessment {
        prediction: Prediction {
            risk_score,
            risk_category,
            missing_features: vector.missing,
        },
        attributions: explanation.attributions,
    })
}

/// Score many records on `pool`, returning results in input order.
///
/// A record that fails to score does not affect the others.
pub fn batch_predict(
    ctx: &Arc<RiskContext>,
    records: Vec<ClinicalRecord>,
    pool: &Pool,
) -> Vec<RiskResult<Prediction>> {
    let start = time::now_ms();
    let count = records.len();
    let (tx, rx) = mpsc::channel();

    for (idx, record) in records.into_iter().enumerate() {
        let ctx = Arc::clone(ctx);
        let tx = tx.clone();
        pool.submit(move || {
            let _ = tx.send((idx, predict(&ctx, &record)));
        });
    }
    drop(tx);

    let mut slots: Vec<Option<RiskResult<Prediction>>> = (0..count).map(|_| None).collect();
    for (idx, result) in rx {
        slots[idx] = Some(result);
    }

    let results: Vec<RiskResult<Prediction>> = slots
        .into_iter()
        .map(|slot| slot.unwrap_or_else(|| Err(RiskError::WorkerLost)))
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    risk_log::log_event(
        if failed == 0 { Level::Debug } else { Level::Warn },
        module_path!(),
        "batch_scored",
        failed as u32,
        time::now_ms().saturating_sub(start),
    );
    results
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::features::domain::{FeatureSchema, StandardizationTable};
    use crate::inference::domain::RiskCategory;
    use crate::model::domain::ModelArtefact;

    fn ctx() -> RiskContext {
        let schema =
            FeatureSchema::new(vec!["date".into(), "age".into(), "diabetes".into()]).unwrap();
        let model: ModelArtefact = serde_json::from_value(json!({
            "kind": "linear",
            "weights": [0.0, 0.01, 0.3]
        }))
        .unwrap();
        RiskContext::new(schema, StandardizationTable::default(), model)
    }

    fn record(value: serde_json::Value) -> ClinicalRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn predict_scores_and_reports_missing() {
        let prediction = predict(&ctx(), &record(json!({"age": 50}))).unwrap();
        assert_eq!(prediction.risk_score, 0.5);
        assert_eq!(prediction.risk_category, RiskCategory::Medium);
        assert_eq!(prediction.missing_features, vec!["diabetes".to_string()]);
    }

    #[test]
    fn assess_combines_prediction_and_attribution() {
        let assessment = assess(&ctx(), &record(json!({"age": 50, "diabetes": "yes"})), 1).unwrap();
        assert_eq!(assessment.prediction.risk_score, 0.8);
        assert_eq!(assessment.prediction.risk_category, RiskCategory::High);
        assert!(assessment.prediction.missing_features.is_empty());
        assert_eq!(assessment.attributions.len(), 1);

        let wire = serde_json::to_value(&assessment).unwrap();
        assert_eq!(wire["risk_category"], json!("High"));
        assert!(wire["attributions"].is_array());
    }

    #[test]
    fn batch_keeps_order_and_isolates_failures() {
        let ctx = Arc::new(ctx());
        let pool = Pool::new(2);
        let records: Vec<ClinicalRecord> = (0..20)
            .map(|age| record(json!({"age": age * 5})))
            .collect();

        let results = batch_predict(&ctx, records.clone(), &pool);
        assert_eq!(results.len(), 20);
        for (result, record) in results.iter().zip(&records) {
            let expected = predict(&ctx, record).unwrap();
            assert_eq!(result.as_ref().unwrap(), &expected);
        }

        let narrow: ModelArtefact =
            serde_json::from_value(json!({"kind": "linear", "weights": [1.0]})).unwrap();
        let broken = Arc::new(RiskContext::new(
            FeatureSchema::new(vec!["age".into(), "bmi".into()]).unwrap(),
            StandardizationTable::default(),
            narrow,
        ));
        let results = batch_predict(&broken, vec![record(json!({"age": 1}))], &pool);
        assert!(results[0].as_ref().unwrap_err().is_client_error());
    }

    #[test]
    fn overflowing_inputs_fail_instead_of_scoring_nan() {
        let model: ModelArtefact =
            serde_json::from_value(json!({"kind": "logistic", "weights": [10.0, 10.0]})).unwrap();
        let ctx = RiskContext::new(
            FeatureSchema::new(vec!["a".into(), "b".into()]).unwrap(),
            StandardizationTable::default(),
            model,
        );
        let rec = record(json!({"a": "1e308", "b": "-1e308"}));

        let err = predict(&ctx, &rec).unwrap_err();
        assert!(matches!(err, RiskError::NonFiniteOutput(_)));
        assert!(err.is_client_error());
        assert!(assess(&ctx, &rec, 2).is_err());
    }
}
