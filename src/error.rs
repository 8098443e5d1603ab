//! Crate error type.
//!
//! Classification and counting never fail; errors only come from loading
//! configuration and reading input files.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = AnalyticsError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AnalyticsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalyticsError::Io {
            path: path.into(),
            source,
        }
    }
}
