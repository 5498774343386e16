//! Error types for extraction operations with parse attempt history.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Record of a single parse attempt on a candidate substring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseAttempt {
    /// The attempt number (1-indexed).
    pub attempt_number: usize,
    /// Normalization applied before this attempt (`"none"` for the first).
    pub normalization: String,
    /// Parser message, `None` when the attempt succeeded.
    pub error: Option<String>,
}

/// Errors that can occur while turning a raw reply into a validated record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    /// The reply contains no `{`, or no `}` that could close it.
    #[error("No JSON object found in model output ({raw_len} bytes)")]
    NoJsonFound {
        /// Length of the raw reply in bytes.
        raw_len: usize,
    },

    /// The candidate never parsed as JSON, even after normalization.
    #[error("JSON parsing failed after {} attempts at line {line}, column {column}: {message}", .attempts.len())]
    JsonDecodeFailure {
        /// Parser message from the verbatim attempt.
        message: String,
        /// The offending candidate substring.
        candidate: String,
        /// 1-based line reported by the parser.
        line: usize,
        /// 1-based column reported by the parser.
        column: usize,
        /// Byte offset into `candidate`, when derivable.
        offset: Option<usize>,
        /// History of every attempt.
        attempts: Vec<ParseAttempt>,
    },

    /// The candidate parsed, but not as a JSON object.
    #[error("Expected a JSON object, found {found}")]
    UnexpectedShape {
        /// JSON type that was found instead.
        found: &'static str,
    },

    /// A required key is absent.
    #[error("Missing required field '{field}'")]
    MissingField {
        /// The missing key.
        field: &'static str,
    },

    /// A field is present but cannot be coerced to the required type.
    #[error("Field '{field}' has the wrong type: expected {expected}, found {found}")]
    TypeMismatch {
        /// The offending key.
        field: &'static str,
        /// What the validator needed.
        expected: &'static str,
        /// What the reply contained.
        found: String,
    },
}

impl ExtractionError {
    /// Stable classification of this error, used in failure records.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::NoJsonFound { .. } => FailureKind::NoJsonFound,
            Self::JsonDecodeFailure { .. } => FailureKind::JsonDecodeFailure,
            Self::UnexpectedShape { .. } => FailureKind::UnexpectedShape,
            Self::MissingField { .. } => FailureKind::MissingField,
            Self::TypeMismatch { .. } => FailureKind::TypeMismatch,
        }
    }
}

/// Classification of an extraction failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// See [`ExtractionError::NoJsonFound`].
    NoJsonFound,
    /// See [`ExtractionError::JsonDecodeFailure`].
    JsonDecodeFailure,
    /// See [`ExtractionError::UnexpectedShape`].
    UnexpectedShape,
    /// See [`ExtractionError::MissingField`].
    MissingField,
    /// See [`ExtractionError::TypeMismatch`].
    TypeMismatch,
    /// The backend call failed before any text was produced.
    Transport,
}

/// Name of a JSON value's type, for diagnostics.
#[must_use]
pub const fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_includes_attempt_count() {
        let err = ExtractionError::JsonDecodeFailure {
            message: "expected `:`".to_string(),
            candidate: "{\"a\" 1}".to_string(),
            line: 1,
            column: 6,
            offset: Some(5),
            attempts: vec![
                ParseAttempt {
                    attempt_number: 1,
                    normalization: "none".to_string(),
                    error: Some("expected `:`".to_string()),
                },
                ParseAttempt {
                    attempt_number: 2,
                    normalization: "collapse_newlines".to_string(),
                    error: Some("expected `:`".to_string()),
                },
            ],
        };
        let text = err.to_string();
        assert!(text.contains("after 2 attempts"));
        assert!(text.contains("line 1, column 6"));
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            ExtractionError::MissingField { field: "score" }.kind(),
            FailureKind::MissingField
        );
        assert_eq!(
            ExtractionError::UnexpectedShape { found: "array" }.kind(),
            FailureKind::UnexpectedShape
        );
    }

    #[test]
    fn test_json_type_name() {
        assert_eq!(json_type_name(&json!([1])), "array");
        assert_eq!(json_type_name(&json!("x")), "string");
        assert_eq!(json_type_name(&json!(null)), "null");
    }
}
