//! Error handling primitives shared across the core.
//!
//! Data-quality problems (missing or malformed fields) are never errors; they
//! are defaulted and reported in `missing_features`. Only startup loading and
//! classifier invocation produce a `RiskError`.

use std::path::PathBuf;

use thiserror::Error;

/// Stable error codes handed to the surrounding layer.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RiskCode {
    /// Success code used as a sentinel.
    Ok = 0,
    /// The request cannot be served with the loaded artefacts (bad request).
    InvalidInput = 1,
    /// A required artefact file was not found at startup.
    ArtefactMissing = 2,
    /// An artefact was found but is structurally unusable.
    InvalidArtefact = 3,
    /// Filesystem failure while reading artefacts.
    Io = 4,
    /// Failures inside the core itself.
    Internal = 5,
}

/// Canonical error type for the core.
#[derive(Debug, Error)]
pub enum RiskError {
    /// The classifier was invoked with a vector of the wrong width.
    #[error("feature vector has {got} entries, model expects {expected}")]
    ShapeMismatch { expected: usize, got: usize },

    /// The classifier produced NaN or an infinity for this row.
    #[error("classifier output is not finite: {0}")]
    NonFiniteOutput(f64),

    #[error("invalid model artefact: {0}")]
    InvalidModel(String),

    #[error("invalid feature schema: {0}")]
    InvalidSchema(String),

    #[error("artefact not found: {}", .0.display())]
    ArtefactMissing(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A batch worker went away before reporting its result.
    #[error("batch worker exited before returning a result")]
    WorkerLost,
}

/// Result alias used throughout the crate.
pub type RiskResult<T> = Result<T, RiskError>;

impl RiskError {
    /// Machine parsable code for this error.
    pub fn code(&self) -> RiskCode {
        match self {
            RiskError::ShapeMismatch { .. } | RiskError::NonFiniteOutput(_) => {
                RiskCode::InvalidInput
            }
            RiskError::ArtefactMissing(_) => RiskCode::ArtefactMissing,
            RiskError::InvalidModel(_) | RiskError::InvalidSchema(_) | RiskError::Json { .. } => {
                RiskCode::InvalidArtefact
            }
            RiskError::Io { .. } => RiskCode::Io,
            RiskError::WorkerLost => RiskCode::Internal,
        }
    }

    /// True when the caller should report this as a client-facing failure.
    pub fn is_client_error(&self) -> bool {
        self.code() == RiskCode::InvalidInput
    }

    /// IO helper keeping the offending path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RiskError::Io {
            path: path.into(),
            source,
        }
    }

    /// JSON helper keeping the offending path.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        RiskError::Json {
            path: path.into(),
            source,
        }
    }
}
