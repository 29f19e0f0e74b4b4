//! Domain-level error types for build-sync.
//!
//! All errors are typed with `thiserror`. The escalation engine and the
//! capability registry are total and never produce these; only the
//! orchestrator, the history store and the I/O adapters do.

use std::path::PathBuf;
use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Failed to open or query the history database.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid data in a project view or stored record.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {message}")]
    JsonParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Another sync attempt holds the project's lock.
    #[error("A sync is already running for this project (lock: {})", lock_path.display())]
    SyncInProgress { lock_path: PathBuf },

    /// The history store returned data that cannot be interpreted.
    #[error("Sync history is corrupt: {message}")]
    HistoryCorruption { message: String },
}

impl AppError {
    /// Create a database error from rusqlite error.
    pub fn database(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Create a JSON parse error.
    pub fn json_parse(err: serde_json::Error) -> Self {
        Self::JsonParse {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }

    /// Create an invalid-data error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }
}

/// Failure reported by the external sync pipeline.
///
/// Both variants leave the previous successful snapshot as the baseline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The pipeline ran and reported failure.
    #[error("sync pipeline failed: {0}")]
    Failed(String),

    /// The pipeline was interrupted before completing.
    #[error("sync pipeline cancelled")]
    Cancelled,
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_messages() {
        assert_eq!(
            PipelineError::Failed("exit status 1".into()).to_string(),
            "sync pipeline failed: exit status 1"
        );
        assert_eq!(PipelineError::Cancelled.to_string(), "sync pipeline cancelled");
    }

    #[test]
    fn test_io_helper_keeps_source() {
        let err = AppError::io(
            "Failed to read",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, AppError::Io { source: Some(_), .. }));
        assert_eq!(err.to_string(), "IO error: Failed to read");
    }
}
