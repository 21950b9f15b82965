//! Runtime configuration loaded from the environment.
//!
//! The snapshot is read once at startup; nothing in the per-call paths looks
//! at the environment again.

use std::env;
use std::path::{Path, PathBuf};

const DEFAULT_TOP_K: usize = 4;
const DEFAULT_WORKERS: usize = 4;

/// Snapshot of configuration values consumed by the core.
#[derive(Clone, Debug)]
pub struct AppCfg {
    pub artefact_dir: PathBuf,
    pub features_file: PathBuf,
    pub stats_file: PathBuf,
    pub model_file: PathBuf,
    pub default_top_k: usize,
    pub workers: usize,
    pub log_level: log::LevelFilter,
}

impl AppCfg {
    /// Create a configuration snapshot from the process environment.
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a snapshot from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let artefact_dir = PathBuf::from(env_or("CLINRISK_ARTEFACT_DIR", "./artefacts"));
        let resolve = |key: &str, default: &str| resolve_in(&artefact_dir, &env_or(key, default));

        Self {
            features_file: resolve("CLINRISK_FEATURES_FILE", "features.json"),
            stats_file: resolve("CLINRISK_STATS_FILE", "zscore_stats.json"),
            model_file: resolve("CLINRISK_MODEL_FILE", "risk_model.json"),
            default_top_k: parse_count(lookup("CLINRISK_TOP_K"), DEFAULT_TOP_K),
            workers: parse_count(lookup("CLINRISK_WORKERS"), DEFAULT_WORKERS),
            log_level: lookup("CLINRISK_LOG_LEVEL")
                .and_then(|raw| raw.trim().parse().ok())
                .unwrap_or(log::LevelFilter::Info),
            artefact_dir,
        }
    }

    /// Snapshot rooted at `dir` with every other value at its default.
    pub fn with_artefact_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_string_lossy().into_owned();
        Self::from_lookup(move |key| (key == "CLINRISK_ARTEFACT_DIR").then(|| dir.clone()))
    }
}

fn resolve_in(dir: &Path, name: &str) -> PathBuf {
    let path = Path::new(name);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        dir.join(path)
    }
}

fn parse_count(raw: Option<String>, default: usize) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(default)
        .max(1)
}
