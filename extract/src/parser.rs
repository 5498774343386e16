//! Strict JSON parsing of a candidate with bounded, cumulative normalization retries.

use serde_json::{Map, Value};

use crate::error::{json_type_name, ExtractionError, ParseAttempt};
use crate::locator::strip_fences;

/// A cheap rewrite applied to a candidate before a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// The candidate as located.
    Verbatim,
    /// Embedded `\r\n`, `\n` and `\r` replaced by single spaces.
    CollapseNewlines,
    /// A leftover fence marker removed and surrounding whitespace trimmed.
    StripFences,
}

impl Normalization {
    /// Normalizations in the order they are applied. Each builds on the previous one.
    pub const SEQUENCE: [Self; 3] = [Self::Verbatim, Self::CollapseNewlines, Self::StripFences];

    /// Short name used in attempt records and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Verbatim => "none",
            Self::CollapseNewlines => "collapse_newlines",
            Self::StripFences => "strip_fences",
        }
    }

    fn apply(self, text: &str) -> String {
        match self {
            Self::Verbatim => text.to_string(),
            Self::CollapseNewlines => text.replace("\r\n", " ").replace(['\n', '\r'], " "),
            Self::StripFences => strip_fences(text).to_string(),
        }
    }
}

/// A successfully parsed object and the attempts it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    /// The extracted object.
    pub object: Map<String, Value>,
    /// Every attempt, the last one successful.
    pub attempts: Vec<ParseAttempt>,
}

/// Parses `candidate` as a JSON object, retrying with [`Normalization::SEQUENCE`].
///
/// At most `max_attempts` attempts are made, and never more than there are
/// normalizations, since a repeated parse of identical text cannot succeed.
///
/// # Errors
///
/// Returns [`ExtractionError::UnexpectedShape`] as soon as a parse yields a
/// non-object value, and [`ExtractionError::JsonDecodeFailure`] once the attempts
/// are exhausted. The failure's message and position come from the verbatim
/// attempt, so they index into the candidate it carries.
pub fn parse_candidate(candidate: &str, max_attempts: usize) -> Result<Parsed, ExtractionError> {
    let limit = max_attempts.clamp(1, Normalization::SEQUENCE.len());
    let mut attempts: Vec<ParseAttempt> = Vec::with_capacity(limit);
    let mut text = candidate.to_string();
    // Positions are only meaningful against the verbatim candidate.
    let mut first_error = None;

    for (index, normalization) in Normalization::SEQUENCE.iter().take(limit).enumerate() {
        text = normalization.apply(&text);

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(object)) => {
                attempts.push(ParseAttempt {
                    attempt_number: index + 1,
                    normalization: normalization.name().to_string(),
                    error: None,
                });
                return Ok(Parsed { object, attempts });
            }
            Ok(other) => {
                return Err(ExtractionError::UnexpectedShape {
                    found: json_type_name(&other),
                });
            }
            Err(e) => {
                tracing::trace!(
                    event = "parse_attempt_failed",
                    attempt = index + 1,
                    normalization = normalization.name(),
                    error = %e,
                    "parse_attempt_failed"
                );
                attempts.push(ParseAttempt {
                    attempt_number: index + 1,
                    normalization: normalization.name().to_string(),
                    error: Some(e.to_string()),
                });
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    let (message, line, column) = first_error.map_or_else(
        || ("no parse attempted".to_string(), 0, 0),
        |e| (e.to_string(), e.line(), e.column()),
    );

    Err(ExtractionError::JsonDecodeFailure {
        offset: byte_offset(candidate, line, column),
        message,
        candidate: candidate.to_string(),
        line,
        column,
        attempts,
    })
}

/// Converts a 1-based line/column position into a byte offset within `text`.
///
/// Returns `None` when the parser gave no position (line 0).
#[must_use]
pub fn byte_offset(text: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    Some((line_start + column.saturating_sub(1)).min(text.len()))
}
