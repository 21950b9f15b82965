//! Read-only state shared by every scoring call.
//!
//! Built once at startup (or by tests from fixtures) and never mutated, so a
//! single `Arc<RiskContext>` can serve concurrent callers without locking.

use log::Level;

use crate::common::config::AppCfg;
use crate::common::error::RiskResult;
use crate::common::{log as risk_log, time};
use crate::explain::domain::{FeatureWeight, ImportanceSource, DEFAULT_TOP_K};
use crate::explain::service::{rank_importance, resolve_source};
use crate::features::domain::{FeatureSchema, StandardizationTable};
use crate::features::repo_fs::{load_schema, load_stats};
use crate::inference::domain::RiskClassifier;
use crate::model::domain::Classifier;
use crate::model::repo_fs::load_model;

#[derive(Clone, Debug)]
pub struct RiskContext {
    schema: FeatureSchema,
    stats: StandardizationTable,
    classifier: RiskClassifier,
    importance_source: ImportanceSource,
    importance: Vec<FeatureWeight>,
    default_top_k: usize,
}

impl RiskContext {
    /// Assemble a context, resolving the importance source once.
    pub fn new<C: Classifier + 'static>(
        schema: FeatureSchema,
        stats: StandardizationTable,
        model: C,
    ) -> Self {
        Self::with_classifier(schema, stats, RiskClassifier::new(model))
    }

    pub fn with_classifier(
        schema: FeatureSchema,
        stats: StandardizationTable,
        classifier: RiskClassifier,
    ) -> Self {
        let importance_source = resolve_source(classifier.model());
        let importance = rank_importance(&schema, &importance_source);
        Self {
            schema,
            stats,
            classifier,
            importance_source,
            importance,
            default_top_k: DEFAULT_TOP_K,
        }
    }

    /// Load schema, statistics and model from the configured files.
    pub fn load(cfg: &AppCfg) -> RiskResult<Self> {
        let start = time::now_ms();
        let schema = load_schema(&cfg.features_file)?;
        let stats = load_stats(&cfg.stats_file)?;
        let model = load_model(&cfg.model_file)?;

        if model.input_width() != schema.len() {
            log::warn!(
                "model expects {} inputs but the schema has {}; predictions will fail",
                model.input_width(),
                schema.len()
            );
        }

        let ctx = Self::new(schema, stats, model).with_default_top_k(cfg.default_top_k);
        log::info!(
            "risk context ready: {} features, {} standardized, importance {}",
            ctx.schema.len(),
            ctx.stats.len(),
            match ctx.importance_source {
                ImportanceSource::Native(_) => "native",
                ImportanceSource::Heuristic => "heuristic",
            }
        );
        risk_log::log_event(
            Level::Info,
            module_path!(),
            "context_loaded",
            0,
            time::now_ms().saturating_sub(start),
        );
        Ok(ctx)
    }

    pub fn with_default_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k.max(1);
        self
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Schema names in classifier input order.
    pub fn feature_names(&self) -> &[String] {
        self.schema.names()
    }

    pub fn stats(&self) -> &StandardizationTable {
        &self.stats
    }

    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    pub fn importance_source(&self) -> &ImportanceSource {
        &self.importance_source
    }

    /// Normalized global ranking, descending.
    pub fn importance(&self) -> &[FeatureWeight] {
        &self.importance
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }
}
