//! Score clamping and the score/details consistency repair.
//!
//! Invariant: a repaired `details` string always begins with
//! `"Veracity Score: {score}"`, where `{score}` is [`format_score`] of the clamped
//! score. Repair is idempotent.

/// Label that opens every verification `details` string.
pub const SCORE_LABEL: &str = "Veracity Score:";

/// Lowest score a verification record may carry.
pub const MIN_SCORE: f64 = 0.0;

/// Highest score a verification record may carry.
pub const MAX_SCORE: f64 = 100.0;

/// Saturates `score` into `[0, 100]`. NaN maps to 0 and `-0.0` to `0.0`.
#[must_use]
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return MIN_SCORE;
    }
    let clamped = score.clamp(MIN_SCORE, MAX_SCORE);
    if clamped == 0.0 {
        MIN_SCORE
    } else {
        clamped
    }
}

/// Canonical decimal form of a score: shortest round-trip representation
/// (`100`, `42.5`, `0`).
#[must_use]
pub fn format_score(score: f64) -> String {
    format!("{score}")
}

/// The exact prefix `details` must start with for `score`.
#[must_use]
pub fn score_prefix(score: f64) -> String {
    format!("{SCORE_LABEL} {}", format_score(score))
}

/// Rewrites `details` so it starts with [`score_prefix`] of `score`.
///
/// Details that already carry the right prefix are returned unchanged. Otherwise any
/// existing score label is discarded and the remaining explanation is kept behind a
/// ` - ` separator.
///
/// ```
/// use veracity_extract::repair::repair_details;
///
/// assert_eq!(
///     repair_details(100.0, "Veracity Score: 150 - Fully supported by sources"),
///     "Veracity Score: 100 - Fully supported by sources"
/// );
/// assert_eq!(
///     repair_details(42.5, "Mostly accurate"),
///     "Veracity Score: 42.5 - Mostly accurate"
/// );
/// ```
#[must_use]
pub fn repair_details(score: f64, details: &str) -> String {
    let prefix = score_prefix(score);

    // "Veracity Score: 10" must not satisfy the prefix for a score of 100.
    if let Some(rest) = details.strip_prefix(prefix.as_str()) {
        if !rest.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            return details.to_string();
        }
    }

    let explanation = strip_score_label(details.trim());
    if explanation.is_empty() {
        prefix
    } else {
        format!("{prefix} - {explanation}")
    }
}

/// Returns the explanation part of `text` with any leading score label removed.
fn strip_score_label(text: &str) -> &str {
    let label = SCORE_LABEL.trim_end_matches(':');
    let Some(after_label) = text
        .get(..label.len())
        .filter(|head| head.eq_ignore_ascii_case(label))
        .map(|_| &text[label.len()..])
    else {
        return text;
    };

    let after_label = after_label.trim_start_matches(|c: char| c == ':' || c.is_whitespace());
    let token = numeric_token_len(after_label);

    if token == 0 {
        return after_label
            .split_once('-')
            .map_or(after_label, |(_, rest)| rest)
            .trim();
    }

    let rest = after_label[token..].trim_start();
    rest.strip_prefix(['-', ':', '\u{2013}', '\u{2014}'])
        .unwrap_or(rest)
        .trim()
}

/// Length in bytes of a leading score token such as `85`, `-5`, `42.5%` or `70/100`.
/// Zero when `text` does not start with a number.
fn numeric_token_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
        end += 1;
    }
    if !bytes[digits_start..end].iter().any(u8::is_ascii_digit) {
        return 0;
    }

    match bytes.get(end) {
        Some(b'%') => end + 1,
        Some(b'/') => {
            let mut scale_end = end + 1;
            while scale_end < bytes.len() && bytes[scale_end].is_ascii_digit() {
                scale_end += 1;
            }
            if scale_end > end + 1 {
                scale_end
            } else {
                end
            }
        }
        _ => end,
    }
}
