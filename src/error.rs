//! Error types for the gradebook library.
//!
//! Only caller-supplied configuration and real I/O failures surface here.
//! Irregular spreadsheet data never produces an error.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GradebookError {
    /// Malformed weight file or an invalid option value.
    #[error("config error: {message}")]
    Config { message: String },

    /// CSV framing error while reading or writing a sheet.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GradebookError>;

impl GradebookError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
