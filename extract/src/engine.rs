//! The extraction engine: runs a raw reply through location, parsing and validation.

use std::fmt;
use std::time::Instant;

use serde_json::{Map, Value};

use crate::config::ExtractionConfig;
use crate::diagnostics::{head, tail};
use crate::error::ExtractionError;
use crate::locator::locate;
use crate::metrics::ExtractionMetrics;
use crate::parser::parse_candidate;
use crate::record::{
    ContentRecord, ContentSchemaVariant, FailureRecord, RecordContext, RecordShape,
    ValidatedRecord, VerificationRecord,
};
use crate::schema::schema_deviations;
use crate::validate::{validate_content, validate_verification};

/// Stages of one extraction request.
///
/// `Fetched → Located → Parsed → Validated → Done`; any stage may end in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Raw reply received.
    Fetched,
    /// Candidate substring found.
    Located,
    /// Candidate parsed into an object.
    Parsed,
    /// Object validated and repaired.
    Validated,
    /// Record handed back to the caller.
    Done,
    /// Terminal failure.
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetched => "fetched",
            Self::Located => "located",
            Self::Parsed => "parsed",
            Self::Validated => "validated",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Turns raw model replies into validated records.
///
/// The engine holds only its configuration, so one instance can serve any number of
/// concurrent requests. Every operation returns a [`FailureRecord`] instead of
/// panicking when the reply cannot be used.
#[derive(Debug, Clone, Default)]
pub struct ExtractionEngine {
    config: ExtractionConfig,
}

impl ExtractionEngine {
    /// Creates an engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with the given configuration.
    #[must_use]
    pub const fn with_config(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Sets the maximum number of parse attempts (fluent builder pattern).
    #[must_use]
    pub const fn max_parse_attempts(mut self, max: usize) -> Self {
        self.config = self.config.with_max_parse_attempts(max);
        self
    }

    /// The engine's configuration.
    #[must_use]
    pub const fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extracts a verification record (`{score, details}`).
    ///
    /// # Errors
    ///
    /// Returns a [`FailureRecord`] when any stage fails.
    pub fn extract_verification(
        &self,
        raw: &str,
        context: &RecordContext,
    ) -> Result<VerificationRecord, FailureRecord> {
        self.extract_verification_with_metrics(raw, context)
            .map(|(record, _)| record)
    }

    /// Like [`Self::extract_verification`], also returning metrics.
    ///
    /// # Errors
    ///
    /// Returns a [`FailureRecord`] when any stage fails.
    pub fn extract_verification_with_metrics(
        &self,
        raw: &str,
        context: &RecordContext,
    ) -> Result<(VerificationRecord, ExtractionMetrics), FailureRecord> {
        self.run(raw, RecordShape::Verification, context, validate_verification)
    }

    /// Extracts a content record in the requested variant.
    ///
    /// # Errors
    ///
    /// Returns a [`FailureRecord`] when any stage fails.
    pub fn extract_content(
        &self,
        raw: &str,
        variant: ContentSchemaVariant,
        context: &RecordContext,
    ) -> Result<ContentRecord, FailureRecord> {
        self.extract_content_with_metrics(raw, variant, context)
            .map(|(record, _)| record)
    }

    /// Like [`Self::extract_content`], also returning metrics.
    ///
    /// # Errors
    ///
    /// Returns a [`FailureRecord`] when any stage fails.
    pub fn extract_content_with_metrics(
        &self,
        raw: &str,
        variant: ContentSchemaVariant,
        context: &RecordContext,
    ) -> Result<(ContentRecord, ExtractionMetrics), FailureRecord> {
        self.run(raw, RecordShape::Content(variant), context, |object| {
            validate_content(object, variant, context)
        })
    }

    /// Extracts whichever record `shape` names.
    ///
    /// # Errors
    ///
    /// Returns a [`FailureRecord`] when any stage fails.
    pub fn extract(
        &self,
        raw: &str,
        shape: RecordShape,
        context: &RecordContext,
    ) -> Result<ValidatedRecord, FailureRecord> {
        match shape {
            RecordShape::Verification => self
                .extract_verification(raw, context)
                .map(ValidatedRecord::Verification),
            RecordShape::Content(variant) => self
                .extract_content(raw, variant, context)
                .map(ValidatedRecord::Content),
        }
    }

    fn run<T, V>(
        &self,
        raw: &str,
        shape: RecordShape,
        context: &RecordContext,
        validate: V,
    ) -> Result<(T, ExtractionMetrics), FailureRecord>
    where
        V: FnOnce(&Map<String, Value>) -> Result<T, ExtractionError>,
    {
        let start = Instant::now();
        let mut metrics = ExtractionMetrics {
            raw_len: raw.len(),
            ..ExtractionMetrics::default()
        };
        tracing::debug!(
            event = "stage",
            stage = %Stage::Fetched,
            shape = ?shape,
            raw_len = raw.len(),
            "stage"
        );

        let candidate = locate(raw, self.config.boundary)
            .map_err(|e| self.fail(Stage::Fetched, &e, raw, None, context))?;
        metrics.located_by = Some(candidate.method);
        metrics.candidate_len = candidate.text.len();
        if self.config.trace_candidates {
            tracing::debug!(
                event = "stage",
                stage = %Stage::Located,
                method = ?candidate.method,
                start = candidate.start,
                end = candidate.end,
                candidate = %candidate.text,
                "stage"
            );
        }

        let parsed = parse_candidate(candidate.text, self.config.max_parse_attempts)
            .map_err(|e| self.fail(Stage::Located, &e, raw, Some(candidate.text), context))?;
        metrics.parse_attempts = parsed.attempts.len();
        tracing::debug!(
            event = "stage",
            stage = %Stage::Parsed,
            attempts = parsed.attempts.len(),
            "stage"
        );

        if tracing::enabled!(tracing::Level::DEBUG) {
            let deviations = schema_deviations(shape, &Value::Object(parsed.object.clone()));
            if !deviations.is_empty() {
                tracing::debug!(
                    event = "schema_deviation",
                    shape = ?shape,
                    deviations = ?deviations,
                    "schema_deviation"
                );
            }
        }

        let record = validate(&parsed.object)
            .map_err(|e| self.fail(Stage::Parsed, &e, raw, Some(candidate.text), context))?;
        metrics.wall_time = start.elapsed();
        tracing::debug!(
            event = "stage",
            stage = %Stage::Done,
            method = ?candidate.method,
            attempts = metrics.parse_attempts,
            wall_time_us = u64::try_from(metrics.wall_time.as_micros()).unwrap_or(u64::MAX),
            "stage"
        );

        Ok((record, metrics))
    }

    /// Logs a failure with enough raw context for offline diagnosis and downgrades it.
    fn fail(
        &self,
        after: Stage,
        error: &ExtractionError,
        raw: &str,
        candidate: Option<&str>,
        context: &RecordContext,
    ) -> FailureRecord {
        let n = self.config.snippet_chars;
        tracing::warn!(
            event = "extraction_failed",
            stage = %Stage::Failed,
            after = %after,
            kind = ?error.kind(),
            error = %error,
            topic = %context.topic,
            raw_len = raw.len(),
            raw_head = %head(raw, n),
            raw_tail = %tail(raw, n),
            candidate = candidate.unwrap_or_default(),
            "extraction_failed"
        );
        FailureRecord::from_error(error, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoundaryStrategy;
    use crate::error::FailureKind;
    use crate::locator::LocateMethod;

    fn context() -> RecordContext {
        RecordContext::new("engine tests")
    }

    #[test]
    fn test_verification_end_to_end() {
        let engine = ExtractionEngine::new();
        let raw = "Here is my verdict:\n```json\n{\"score\": \"72\", \"details\": \"Veracity Score: 80 - dates are off\"}\n```";
        let (record, metrics) = engine
            .extract_verification_with_metrics(raw, &context())
            .unwrap();
        assert!((record.score - 72.0).abs() < f64::EPSILON);
        assert_eq!(record.details, "Veracity Score: 72 - dates are off");
        assert_eq!(metrics.located_by, Some(LocateMethod::Balanced));
        assert_eq!(metrics.parse_attempts, 1);
        assert_eq!(metrics.raw_len, raw.len());
    }

    #[test]
    fn test_failure_kinds_by_stage() {
        let engine = ExtractionEngine::new();
        let ctx = context();

        let no_json = engine.extract_verification("no braces here", &ctx).unwrap_err();
        assert_eq!(no_json.kind, FailureKind::NoJsonFound);

        let decode = engine
            .extract_verification("{\"score\": 1, \"details\": }", &ctx)
            .unwrap_err();
        assert_eq!(decode.kind, FailureKind::JsonDecodeFailure);

        let shape = engine.extract_verification("[1, 2]", &ctx).unwrap_err();
        assert_eq!(shape.kind, FailureKind::UnexpectedShape);

        let missing = engine.extract_verification("{\"foo\":\"bar\"}", &ctx).unwrap_err();
        assert_eq!(missing.kind, FailureKind::MissingField);

        let mismatch = engine
            .extract_verification("{\"score\": \"high\", \"details\": \"x\"}", &ctx)
            .unwrap_err();
        assert_eq!(mismatch.kind, FailureKind::TypeMismatch);
        assert_eq!(mismatch.metadata.topic, "engine tests");
    }

    #[test]
    fn test_extract_dispatches_on_shape() {
        let engine = ExtractionEngine::new();
        let record = engine
            .extract(
                "{\"content\": \"a b\"}",
                RecordShape::Content(ContentSchemaVariant::Plain),
                &context(),
            )
            .unwrap();
        match record {
            ValidatedRecord::Content(content) => assert_eq!(content.metadata.word_count, 2),
            ValidatedRecord::Verification(_) => panic!("wrong record kind"),
        }
    }

    #[test]
    fn test_naive_strategy_is_selectable() {
        let engine = ExtractionEngine::with_config(
            ExtractionConfig::default().with_boundary(BoundaryStrategy::Naive),
        );
        let (_, metrics) = engine
            .extract_content_with_metrics(
                "prose {\"content\": \"x\"} more prose",
                ContentSchemaVariant::Plain,
                &context(),
            )
            .unwrap();
        assert_eq!(metrics.located_by, Some(LocateMethod::Naive));
    }

    #[test]
    fn test_single_parse_attempt_config() {
        let engine = ExtractionEngine::new().max_parse_attempts(1);
        let failure = engine
            .extract_content("{\"content\": \"a\nb\"}", ContentSchemaVariant::Plain, &context())
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::JsonDecodeFailure);

        let record = ExtractionEngine::new()
            .extract_content("{\"content\": \"a\nb\"}", ContentSchemaVariant::Plain, &context())
            .unwrap();
        assert_eq!(record.content, "a b");
    }
}
