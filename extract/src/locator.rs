//! Candidate location: find the substring of a reply most likely to be the JSON object.
//!
//! Models wrap JSON in prose, markdown fences, or both. The locator tries, in order:
//! 1. Direct parse of the trimmed reply
//! 2. Direct parse after stripping a leading/trailing fence marker
//! 3. A depth-tracking scan for the first balanced `{...}` (string literals honoured)
//! 4. First `{` to last `}`

use serde::{Deserialize, Serialize};

use crate::config::BoundaryStrategy;
use crate::error::ExtractionError;

/// Markdown code-fence marker.
pub const FENCE: &str = "```";

/// Which locator step produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocateMethod {
    /// The whole trimmed reply is valid JSON.
    Direct,
    /// The reply parsed once its fence markers were removed.
    Fenced,
    /// Depth-tracking scan.
    Balanced,
    /// First `{` to last `}`.
    Naive,
}

/// A candidate substring together with where it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    /// The candidate text.
    pub text: &'a str,
    /// Byte offset of the candidate in the raw reply.
    pub start: usize,
    /// Byte offset one past the end of the candidate in the raw reply.
    pub end: usize,
    /// The step that located it.
    pub method: LocateMethod,
}

impl<'a> Candidate<'a> {
    fn within(raw: &'a str, text: &'a str, method: LocateMethod) -> Self {
        let start = text.as_ptr() as usize - raw.as_ptr() as usize;
        Self {
            text,
            start,
            end: start + text.len(),
            method,
        }
    }

    fn span(raw: &'a str, start: usize, end: usize, method: LocateMethod) -> Self {
        Self {
            text: &raw[start..end],
            start,
            end,
            method,
        }
    }
}

/// Outcome of the depth-tracking scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    /// A balanced object spanning `start..end`.
    Closed(usize, usize),
    /// An object opened but never closed.
    Unclosed,
    /// No `{` at all.
    NoOpen,
}

/// Locates the candidate JSON object in `raw`.
///
/// A reply that is entirely valid JSON, bare or inside one fence, is returned whole
/// even when it is not an object: shape is judged by the parser, which reports
/// [`ExtractionError::UnexpectedShape`] rather than digging an object out of an
/// array.
///
/// # Errors
///
/// Returns [`ExtractionError::NoJsonFound`] when the reply has no `{`, or no `}`
/// after it.
pub fn locate(raw: &str, strategy: BoundaryStrategy) -> Result<Candidate<'_>, ExtractionError> {
    let trimmed = raw.trim();

    if parses_as_json(trimmed) {
        return Ok(Candidate::within(raw, trimmed, LocateMethod::Direct));
    }

    let unfenced = strip_fences(trimmed);
    if unfenced.len() != trimmed.len() && parses_as_json(unfenced) {
        return Ok(Candidate::within(raw, unfenced, LocateMethod::Fenced));
    }

    let no_json = || ExtractionError::NoJsonFound { raw_len: raw.len() };
    match strategy {
        BoundaryStrategy::Balanced => match balanced_scan(raw) {
            Scan::Closed(start, end) => Ok(Candidate::span(raw, start, end, LocateMethod::Balanced)),
            Scan::Unclosed => naive_span(raw).ok_or_else(no_json),
            Scan::NoOpen => Err(no_json()),
        },
        BoundaryStrategy::Naive => naive_span(raw).ok_or_else(no_json),
    }
}

/// Removes a leading fence marker (with its optional language tag) and a trailing
/// fence marker, then trims. Text without markers is only trimmed.
#[must_use]
pub fn strip_fences(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix(FENCE) {
        body = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }
    if let Some(rest) = body.trim_end().strip_suffix(FENCE) {
        body = rest;
    }
    body.trim()
}

fn parses_as_json(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text).is_ok()
}

/// Scans for the first balanced object. Quotes only open string literals once an
/// object has opened, so apostrophes and quotes in leading prose are harmless.
fn balanced_scan(text: &str) -> Scan {
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, byte) in text.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' if start.is_some() => in_string = true,
            b'{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(open) = start {
                        return Scan::Closed(open, i + 1);
                    }
                }
            }
            _ => {}
        }
    }

    if start.is_some() {
        Scan::Unclosed
    } else {
        Scan::NoOpen
    }
}

fn naive_span(raw: &str) -> Option<Candidate<'_>> {
    let start = raw.find('{')?;
    let close = raw.rfind('}')?;
    (close > start).then(|| Candidate::span(raw, start, close + 1, LocateMethod::Naive))
}
