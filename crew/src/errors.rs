//! Error types for backend calls and crew runs.

use std::time::Duration;

use thiserror::Error;
use veracity_extract::{FailureKind, FailureRecord, RecordContext};

/// Failure of a single backend call. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The provider rejected or failed the request.
    #[error("Backend request failed: {0}")]
    Backend(String),

    /// The provider did not answer within the step timeout.
    #[error("Backend timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors relating to the crew.
#[derive(Debug, Error)]
pub enum CrewError {
    /// A backend call failed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The final reply could not be turned into a record.
    #[error("Extraction failed: {0}")]
    Extraction(Box<FailureRecord>),

    /// Missing credentials or invalid settings.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CrewError {
    /// Downgrades this error into the failure record handed to callers.
    #[must_use]
    pub fn into_failure_record(self, context: &RecordContext) -> FailureRecord {
        match self {
            Self::Extraction(failure) => *failure,
            other => FailureRecord::new(FailureKind::Transport, other.to_string(), context),
        }
    }
}
