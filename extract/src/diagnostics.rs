//! Diagnostic helpers: char-safe snippets of raw replies and re-query feedback.

use serde_json::Value;

/// The first `n` characters of `text`.
///
/// ```
/// use veracity_extract::diagnostics::head;
///
/// assert_eq!(head("résumé", 3), "rés");
/// assert_eq!(head("ab", 10), "ab");
/// ```
#[must_use]
pub fn head(text: &str, n: usize) -> &str {
    text.char_indices().nth(n).map_or(text, |(end, _)| &text[..end])
}

/// The last `n` characters of `text`.
#[must_use]
pub fn tail(text: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    text.char_indices()
        .rev()
        .nth(n - 1)
        .map_or(text, |(start, _)| &text[start..])
}

/// `text` cut to `n` characters with a trailing `...` when something was cut.
#[must_use]
pub fn truncate(text: &str, n: usize) -> String {
    let cut = head(text, n);
    if cut.len() < text.len() {
        format!("{cut}...")
    } else {
        cut.to_string()
    }
}

/// Builds the message appended to a step's prompt when its reply could not be
/// extracted and the step is asked again.
///
/// Includes:
/// - Attempt counter (e.g., "Attempt 1/3")
/// - The extraction failure
/// - The reply, truncated to `snippet_chars` characters
/// - The expected schema
/// - An instruction to answer with JSON only
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use veracity_extract::diagnostics::build_requery_feedback;
///
/// let schema = json!({"type": "object"});
/// let feedback = build_requery_feedback("No JSON object found", "I refuse.", 1, 3, &schema, 200);
/// assert!(feedback.contains("Attempt 1/3"));
/// assert!(feedback.contains("I refuse."));
/// ```
#[must_use]
pub fn build_requery_feedback(
    failure: &str,
    raw_text: &str,
    attempt: usize,
    max_attempts: usize,
    schema: &Value,
    snippet_chars: usize,
) -> String {
    let mut feedback = format!(
        "Attempt {attempt}/{max_attempts}: Your previous reply could not be used.\n\n"
    );

    feedback.push_str("Problem: ");
    feedback.push_str(failure);
    feedback.push_str("\n\n");

    feedback.push_str(&format!("Your reply (first {snippet_chars} chars):\n"));
    feedback.push_str(&truncate(raw_text, snippet_chars));

    feedback.push_str("\n\nExpected schema:\n");
    let schema_str = serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());
    feedback.push_str(&schema_str);

    feedback.push_str(
        "\n\nRespond with a single JSON object matching the schema above and nothing else.",
    );

    feedback
}
