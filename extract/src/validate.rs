//! Semantic validation: required fields, type coercion, clamping and consistency repair.

use serde_json::{Map, Value};

use crate::error::{json_type_name, ExtractionError};
use crate::record::{
    ContentMetadata, ContentRecord, ContentSchemaVariant, RecordContext, VerificationRecord,
};
use crate::repair::{clamp_score, repair_details};

/// Metadata keys owned by the caller context, never copied from the reply.
const RESERVED_METADATA: [&str; 4] = ["topic", "timestamp", "word_count", "model_used"];

/// Optional content fields that pass through unvalidated.
const PASSTHROUGH_FIELDS: [&str; 4] = ["structure", "citations", "improvements", "readability_score"];

/// Validates a verification object, clamping the score and repairing `details`.
///
/// # Errors
///
/// [`ExtractionError::MissingField`] when `score` or `details` is absent,
/// [`ExtractionError::TypeMismatch`] when either cannot be coerced.
pub fn validate_verification(object: &Map<String, Value>) -> Result<VerificationRecord, ExtractionError> {
    let raw_score = object
        .get("score")
        .ok_or(ExtractionError::MissingField { field: "score" })?;
    let raw_details = object
        .get("details")
        .ok_or(ExtractionError::MissingField { field: "details" })?;

    let score = clamp_score(coerce_score(raw_score)?);
    let details = match raw_details {
        Value::String(text) => text,
        other => {
            return Err(ExtractionError::TypeMismatch {
                field: "details",
                expected: "string",
                found: json_type_name(other).to_string(),
            })
        }
    };

    let repaired = repair_details(score, details);
    if repaired != *details {
        tracing::debug!(
            event = "details_repaired",
            score,
            original = %details,
            repaired = %repaired,
            "details_repaired"
        );
    }

    Ok(VerificationRecord {
        score,
        details: repaired,
    })
}

/// Coerces a JSON value to a finite score.
///
/// Numbers are taken as is. Strings are accepted when their trimmed text, minus an
/// optional trailing `%`, parses as a finite number.
///
/// # Errors
///
/// [`ExtractionError::TypeMismatch`] for any other value.
pub fn coerce_score(value: &Value) -> Result<f64, ExtractionError> {
    let mismatch = |found: String| ExtractionError::TypeMismatch {
        field: "score",
        expected: "number",
        found,
    };

    let score = match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| mismatch(number.to_string()))?,
        Value::String(text) => {
            let trimmed = text.trim();
            let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
            trimmed
                .parse::<f64>()
                .map_err(|_| mismatch(format!("string {text:?}")))?
        }
        other => return Err(mismatch(json_type_name(other).to_string())),
    };

    if score.is_finite() {
        Ok(score)
    } else {
        Err(mismatch(format!("non-finite {score}")))
    }
}

/// Number of whitespace-delimited tokens in `content`.
#[must_use]
pub fn count_words(content: &str) -> usize {
    content.split_whitespace().count()
}

/// Validates a content object for the requested variant.
///
/// The word count is computed locally unless the variant asks the model to report
/// one (see [`ContentSchemaVariant::trusts_upstream_word_count`]) and the reply
/// contains a non-negative integer count.
///
/// # Errors
///
/// [`ExtractionError::MissingField`] when `content` is absent,
/// [`ExtractionError::TypeMismatch`] when it is not a string.
pub fn validate_content(
    object: &Map<String, Value>,
    variant: ContentSchemaVariant,
    context: &RecordContext,
) -> Result<ContentRecord, ExtractionError> {
    let content = match object.get("content") {
        None => return Err(ExtractionError::MissingField { field: "content" }),
        Some(Value::String(text)) => text.clone(),
        Some(other) => {
            return Err(ExtractionError::TypeMismatch {
                field: "content",
                expected: "string",
                found: json_type_name(other).to_string(),
            })
        }
    };

    let upstream_metadata = object.get("metadata").and_then(Value::as_object);
    let local_count = count_words(&content);
    let upstream_count = upstream_metadata
        .and_then(|metadata| metadata.get("word_count"))
        .or_else(|| object.get("word_count"))
        .and_then(Value::as_u64)
        .and_then(|count| usize::try_from(count).ok());

    if let Some(reported) = upstream_count.filter(|reported| *reported != local_count) {
        tracing::warn!(
            event = "word_count_mismatch",
            reported,
            computed = local_count,
            variant = ?variant,
            "word_count_mismatch"
        );
    }

    let word_count = if variant.trusts_upstream_word_count() {
        upstream_count.unwrap_or(local_count)
    } else {
        local_count
    };

    let passthrough = |key: &str, default: Value| {
        object
            .get(key)
            .or_else(|| upstream_metadata.and_then(|metadata| metadata.get(key)))
            .filter(|value| !value.is_null())
            .cloned()
            .unwrap_or(default)
    };

    let extra = upstream_metadata
        .map(|metadata| {
            metadata
                .iter()
                .filter(|(key, _)| {
                    !RESERVED_METADATA.contains(&key.as_str())
                        && !PASSTHROUGH_FIELDS.contains(&key.as_str())
                })
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect::<Map<String, Value>>()
        })
        .unwrap_or_default();

    Ok(ContentRecord {
        content,
        metadata: ContentMetadata {
            topic: context.topic.clone(),
            timestamp: context.timestamp,
            word_count,
            model_used: context.model_used.clone(),
            structure: passthrough("structure", Value::Array(Vec::new())),
            citations: passthrough("citations", Value::Array(Vec::new())),
            improvements: passthrough("improvements", Value::Array(Vec::new())),
            readability_score: passthrough("readability_score", Value::from(0)),
            extra,
        },
    })
}
