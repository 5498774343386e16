//! Per-request extraction metrics and token estimation.

use std::time::Duration;

use crate::locator::LocateMethod;

/// Metrics collected while extracting one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionMetrics {
    /// Parse attempts used on the candidate.
    pub parse_attempts: usize,
    /// Length of the raw reply in bytes.
    pub raw_len: usize,
    /// Length of the located candidate in bytes.
    pub candidate_len: usize,
    /// Which locator step found the candidate.
    pub located_by: Option<LocateMethod>,
    /// Wall-clock time spent in the engine.
    pub wall_time: Duration,
}

/// Estimate token count from text using the standard 4-chars-per-token heuristic.
///
/// Uses `chars().count()` to handle UTF-8 correctly (not `len()` which counts bytes).
/// Returns ceiling division to avoid underestimation.
///
/// # Examples
///
/// ```
/// use veracity_extract::estimate_tokens;
///
/// assert_eq!(estimate_tokens("hello"), 2);  // 5 chars / 4 = 1.25 -> 2
/// assert_eq!(estimate_tokens("hello world"), 3);  // 11 chars / 4 = 2.75 -> 3
/// ```
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}
