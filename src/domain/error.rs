// ============================================================
// Layer 3 — Pipeline Errors
// ============================================================
// Failures the data, ml and infra layers can name precisely.
// The application layer wraps these in anyhow with context;
// the API layer turns them into HTTP responses.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("column '{0}' is not present in the table")]
    MissingColumn(String),

    #[error("column '{0}' has no observed values")]
    EmptyColumn(String),

    #[error("{0} must be fitted before transform")]
    NotFitted(&'static str),

    #[error("column '{column}' has {actual} values, expected {expected}")]
    ColumnLengthMismatch {
        column:   String,
        expected: usize,
        actual:   usize,
    },

    #[error("quantiles must satisfy 0 <= lower ({lower}) <= upper ({upper}) <= 1")]
    InvalidQuantiles { lower: f64, upper: f64 },

    #[error("price range label {0} is outside 0..=3")]
    InvalidLabel(f64),

    #[error("feature '{column}' has non-finite value {value}")]
    InvalidFeature { column: String, value: f64 },

    #[error("{path}:{line}: {message}")]
    Parse {
        path:    PathBuf,
        line:    usize,
        message: String,
    },

    #[error("model file '{0}' not found; run training first")]
    ModelNotFound(PathBuf),

    #[error("model file '{path}' is malformed: {reason}")]
    MalformedModel { path: PathBuf, reason: String },
}
