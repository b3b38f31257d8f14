use std::path::PathBuf;

use thiserror::Error;

/// Felles feiltype for hele kjernen.
#[derive(Error, Debug)]
pub enum HfError {
    /// Sample som bryter serie-invarianten (koordinater, tid, høyde).
    #[error("invalid sample #{index}: {reason}")]
    InvalidSample { index: usize, reason: String },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// LogicalPhase bygget fra tom fase-gruppe – programmeringsfeil.
    #[error("logical phase requires at least one phase")]
    DegenerateLogicalPhase,

    #[error("malformed IGC record at line {line}: {reason}")]
    Igc { line: usize, reason: String },

    #[error("no reader can handle {0}")]
    NoReader(PathBuf),

    #[error("JSON error at `{path}`: {message}")]
    Json { path: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HfError {
    pub(crate) fn invalid_sample(index: usize, reason: impl Into<String>) -> Self {
        HfError::InvalidSample { index, reason: reason.into() }
    }
}

impl From<serde_path_to_error::Error<serde_json::Error>> for HfError {
    fn from(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        HfError::Json {
            path: err.path().to_string(),
            message: err.inner().to_string(),
        }
    }
}
