//! Terminal record types returned to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::{ExtractionError, FailureKind};

/// Recognized target shapes for a content record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentSchemaVariant {
    /// `{content}`.
    #[default]
    Plain,
    /// `{content, metadata: {word_count}}`. The only variant that trusts an
    /// upstream word count.
    WithWordCount,
    /// `{content, structure, word_count}`.
    Factual,
}

impl ContentSchemaVariant {
    /// Whether the model is asked to report its own word count.
    #[must_use]
    pub const fn trusts_upstream_word_count(self) -> bool {
        matches!(self, Self::WithWordCount)
    }
}

/// Which record the caller expects from a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordShape {
    /// `{score, details}`.
    Verification,
    /// `{content, metadata}` in the given variant.
    Content(ContentSchemaVariant),
}

/// Caller-owned metadata stamped onto content and failure records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordContext {
    /// The topic or passage the request was about.
    pub topic: String,
    /// When the request was made.
    pub timestamp: DateTime<Utc>,
    /// Backend model name, when known.
    pub model_used: Option<String>,
}

impl RecordContext {
    /// Context stamped with the current time.
    #[must_use]
    pub fn new(topic: impl Into<String>) -> Self {
        Self::at(topic, Utc::now())
    }

    /// Context with an explicit timestamp.
    #[must_use]
    pub fn at(topic: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            topic: topic.into(),
            timestamp,
            model_used: None,
        }
    }

    /// Records which backend model produced the reply.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_used = Some(model.into());
        self
    }
}

/// A validated fact-check result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// Veracity score in `[0, 100]`.
    pub score: f64,
    /// Explanation, always starting with `"Veracity Score: {score}"`.
    pub details: String,
}

/// Metadata of a content record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentMetadata {
    /// Requested topic.
    pub topic: String,
    /// Request time.
    pub timestamp: DateTime<Utc>,
    /// Whitespace-delimited word count of `content`.
    pub word_count: usize,
    /// Backend model name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    /// Section outline, passed through as given.
    pub structure: Value,
    /// Citations, passed through as given.
    pub citations: Value,
    /// Editorial suggestions, passed through as given.
    pub improvements: Value,
    /// Readability score, passed through as given.
    pub readability_score: Value,
    /// Any other metadata keys reported by the model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A validated piece of generated content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// The generated text.
    pub content: String,
    /// Derived and passed-through metadata.
    pub metadata: ContentMetadata,
}

/// Either kind of validated record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidatedRecord {
    /// A fact-check result.
    Verification(VerificationRecord),
    /// Generated content.
    Content(ContentRecord),
}

/// Status marker carried by failure records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    /// The request did not produce a record.
    Failed,
}

/// Metadata of a failure record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureMetadata {
    /// Requested topic.
    pub topic: String,
    /// Request time.
    pub timestamp: DateTime<Utc>,
}

/// Structured failure returned in place of a record.
///
/// Never carries data from stages that ran before the failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{error}")]
pub struct FailureRecord {
    /// Always [`RecordStatus::Failed`].
    pub status: RecordStatus,
    /// Human-readable reason.
    pub error: String,
    /// Machine-readable reason.
    pub kind: FailureKind,
    /// Caller context.
    pub metadata: FailureMetadata,
}

impl FailureRecord {
    /// Builds a failure record of the given kind.
    #[must_use]
    pub fn new(kind: FailureKind, error: impl Into<String>, context: &RecordContext) -> Self {
        Self {
            status: RecordStatus::Failed,
            error: error.into(),
            kind,
            metadata: FailureMetadata {
                topic: context.topic.clone(),
                timestamp: context.timestamp,
            },
        }
    }

    /// Downgrades an extraction error into a failure record.
    #[must_use]
    pub fn from_error(error: &ExtractionError, context: &RecordContext) -> Self {
        Self::new(error.kind(), error.to_string(), context)
    }
}
