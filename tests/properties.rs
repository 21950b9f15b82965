use std::collections::HashSet;

use proptest::prelude::*;
use serde_json::{json, Value};

use clinrisk::explain::domain::ImportanceSource;
use clinrisk::explain::service::{explain_vector, rank_importance};
use clinrisk::features::service::build_vector;
use clinrisk::features::FeatureVector;
use clinrisk::{ClinicalRecord, FeatureSchema, StandardizationTable, ZStat};

fn recordable_names() -> Vec<String> {
    FeatureSchema::builtin()
        .names()
        .iter()
        .filter(|n| !matches!(n.as_str(), "date" | "day_index"))
        .cloned()
        .collect()
}

fn field_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        (-500.0f64..500.0).prop_map(|v| json!(v)),
        "[0-9]{1,3}".prop_map(Value::String),
        Just(json!("yes")),
        Just(json!("no")),
        Just(json!("maybe")),
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
    ]
}

fn clinical_record() -> impl Strategy<Value = ClinicalRecord> {
    prop::collection::vec((prop::sample::select(recordable_names()), field_value()), 0..24)
        .prop_map(|fields| fields.into_iter().collect())
}

proptest! {
    #[test]
    fn rows_match_schema_width(record in clinical_record()) {
        let schema = FeatureSchema::builtin();
        let vector = build_vector(&schema, &StandardizationTable::default(), &record);
        prop_assert_eq!(vector.len(), schema.len());
    }

    #[test]
    fn absent_fields_are_reported_once_and_zeroed(record in clinical_record()) {
        let schema = FeatureSchema::builtin();
        let stats: StandardizationTable =
            [("age".to_string(), ZStat::new(60.0, 10.0))].into_iter().collect();
        let vector = build_vector(&schema, &stats, &record);

        let unique: HashSet<&String> = vector.missing.iter().collect();
        prop_assert_eq!(unique.len(), vector.missing.len());

        let positions: Vec<usize> = vector
            .missing
            .iter()
            .map(|name| schema.position(name).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        for pos in positions {
            prop_assert_eq!(vector.values[pos], 0.0);
        }

        for name in recordable_names() {
            // age_z is always computed: the table has an age entry.
            if !record.contains_key(&name) && name != "age_z" {
                prop_assert!(vector.missing.contains(&name), "{} not reported", name);
            }
        }
    }

    #[test]
    fn native_ranking_is_normalized(raw in prop::collection::vec(-10.0f64..10.0, 0..8)) {
        let schema = FeatureSchema::new((0..6).map(|i| format!("f{i}")).collect()).unwrap();
        let ranking = rank_importance(&schema, &ImportanceSource::Native(raw.clone()));

        prop_assert_eq!(ranking.len(), schema.len());
        prop_assert!(ranking.windows(2).all(|w| w[0].importance >= w[1].importance));

        let total: f64 = ranking.iter().map(|w| w.importance).sum();
        if raw.iter().take(schema.len()).any(|v| *v != 0.0) {
            prop_assert!((total - 1.0).abs() < 1e-6);
        } else {
            prop_assert_eq!(total, 0.0);
        }
    }

    #[test]
    fn attributions_take_the_nonzero_top_k(
        values in prop::collection::vec(prop_oneof![Just(0.0f64), -5.0f64..5.0], 6),
        top_k in 0usize..10,
    ) {
        let schema = FeatureSchema::new(
            ["age", "gender", "diabetes", "sbp_mean", "age_z", "sbp_mean_z"]
                .iter()
                .map(|n| n.to_string())
                .collect(),
        )
        .unwrap();
        let importance = rank_importance(&schema, &ImportanceSource::Heuristic);
        let vector = FeatureVector { values, missing: Vec::new() };

        // Base features read their z-scored slot when the schema has one.
        let nonzero = schema
            .names()
            .iter()
            .enumerate()
            .filter(|(pos, name)| {
                let slot = schema.position(&format!("{name}_z")).unwrap_or(*pos);
                let weight = importance
                    .iter()
                    .find(|w| &w.feature == *name)
                    .map_or(0.0, |w| w.importance);
                vector.values[slot] * weight != 0.0
            })
            .count();
        let expected = top_k.max(1).min(nonzero).max(1);

        let explanation = explain_vector(&schema, &vector, &importance, top_k);
        prop_assert_eq!(explanation.attributions.len(), expected);
        prop_assert!(explanation
            .attributions
            .windows(2)
            .all(|w| w[0].magnitude >= w[1].magnitude));
    }
}
