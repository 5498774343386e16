//! JSON Schemas of the payloads a model is asked to emit, derived with `schemars`.
//!
//! The schemas describe what the prompt requests, not what the validator accepts:
//! validation is lenient (numeric strings, out-of-range scores), so a deviation from
//! the schema is only a diagnostic.

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::record::{ContentSchemaVariant, RecordShape};

/// Payload requested from a fact checker.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VerificationPayload {
    /// Veracity score from 0 (false) to 100 (fully supported).
    pub score: f64,
    /// Explanation starting with "Veracity Score: <score> - ".
    pub details: String,
}

/// Payload for [`ContentSchemaVariant::Plain`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlainContentPayload {
    /// The finished text.
    pub content: String,
}

/// Metadata block of [`CountedContentPayload`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WordCountMetadata {
    /// Number of words in `content`.
    pub word_count: u64,
}

/// Payload for [`ContentSchemaVariant::WithWordCount`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CountedContentPayload {
    /// The finished text.
    pub content: String,
    /// Self-reported metadata.
    pub metadata: WordCountMetadata,
}

/// Payload for [`ContentSchemaVariant::Factual`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FactualContentPayload {
    /// The finished text.
    pub content: String,
    /// Section headings in order.
    pub structure: Vec<String>,
    /// Number of words in `content`.
    pub word_count: u64,
}

/// JSON Schema for the payload of `shape`.
#[must_use]
pub fn payload_schema(shape: RecordShape) -> Value {
    match shape {
        RecordShape::Verification => json!(schema_for!(VerificationPayload)),
        RecordShape::Content(ContentSchemaVariant::Plain) => json!(schema_for!(PlainContentPayload)),
        RecordShape::Content(ContentSchemaVariant::WithWordCount) => {
            json!(schema_for!(CountedContentPayload))
        }
        RecordShape::Content(ContentSchemaVariant::Factual) => {
            json!(schema_for!(FactualContentPayload))
        }
    }
}

/// A minimal payload of `shape`, used as an example in prompts.
#[must_use]
pub fn example_payload(shape: RecordShape) -> Value {
    match shape {
        RecordShape::Verification => json!(VerificationPayload {
            score: 85.0,
            details: "Veracity Score: 85 - The main claims match primary sources.".to_string(),
        }),
        RecordShape::Content(ContentSchemaVariant::Plain) => json!(PlainContentPayload {
            content: "Article text.".to_string(),
        }),
        RecordShape::Content(ContentSchemaVariant::WithWordCount) => json!(CountedContentPayload {
            content: "Article text.".to_string(),
            metadata: WordCountMetadata { word_count: 2 },
        }),
        RecordShape::Content(ContentSchemaVariant::Factual) => json!(FactualContentPayload {
            content: "Article text.".to_string(),
            structure: vec!["Introduction".to_string()],
            word_count: 2,
        }),
    }
}

/// Collects every way `instance` deviates from the payload schema of `shape`.
///
/// Returns formatted messages with instance paths; empty when it conforms.
#[must_use]
pub fn schema_deviations(shape: RecordShape, instance: &Value) -> Vec<String> {
    let schema = payload_schema(shape);
    match jsonschema::Validator::new(&schema) {
        Ok(validator) => validator
            .iter_errors(instance)
            .map(|error| format!("At path '{}': {}", error.instance_path, error))
            .collect(),
        Err(e) => vec![format!("Schema compilation error: {e}")],
    }
}
