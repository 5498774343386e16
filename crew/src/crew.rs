//! Sequential multi-role pipelines ending in an extracted record.

use veracity_extract::diagnostics::{build_requery_feedback, truncate};
use veracity_extract::schema::payload_schema;
use veracity_extract::{
    estimate_tokens, ContentRecord, ContentSchemaVariant, ExtractionEngine, FailureRecord,
    RecordContext, RecordShape, VerificationRecord,
};

use crate::config::CrewConfig;
use crate::errors::CrewError;
use crate::prompt::{PromptSpec, StepOutput};
use crate::roles::AgentRole;
use crate::runner::StepRunner;

/// Characters of a fact-checked passage kept as the record topic.
const TOPIC_CHARS: usize = 120;

/// Runs fact-check and content pipelines against one [`StepRunner`].
///
/// Each step's reply is threaded into the prompts of later steps; only the last
/// step's reply is extracted.
pub struct ResearchCrew<R> {
    runner: R,
    engine: ExtractionEngine,
    config: CrewConfig,
}

impl<R: StepRunner> ResearchCrew<R> {
    /// Creates a crew over `runner`.
    #[must_use]
    pub fn new(runner: R, config: CrewConfig) -> Self {
        Self {
            runner,
            engine: ExtractionEngine::with_config(config.extraction.clone()),
            config,
        }
    }

    /// The crew's configuration.
    #[must_use]
    pub const fn config(&self) -> &CrewConfig {
        &self.config
    }

    /// Researches `content`, then has a fact checker score it.
    ///
    /// # Errors
    ///
    /// Returns a [`FailureRecord`] when a backend call fails or the fact checker's
    /// reply cannot be extracted.
    pub async fn run_fact_check(&self, content: &str) -> Result<VerificationRecord, FailureRecord> {
        let context = self.record_context(truncate(content.trim(), TOPIC_CHARS));
        tracing::info!(event = "fact_check_started", topic = %context.topic, "fact_check_started");

        let result = async {
            let research = self
                .call(&PromptSpec::new(
                    AgentRole::Researcher,
                    format!("Research and gather evidence about: {content}"),
                ))
                .await?;

            let verify = PromptSpec::new(
                AgentRole::FactChecker,
                format!(
                    "Verify the information and provide a veracity score (0-100) for: {content}"
                ),
            )
            .with_context(vec![StepOutput {
                role: AgentRole::Researcher,
                text: research,
            }])
            .expecting(RecordShape::Verification);

            self.finish(verify, RecordShape::Verification, |raw| {
                self.engine.extract_verification(raw, &context)
            })
            .await
        }
        .await;

        result.map_err(|e| e.into_failure_record(&context))
    }

    /// Researches `topic`, drafts content, then edits it into a record of `variant`.
    ///
    /// # Errors
    ///
    /// Returns a [`FailureRecord`] when a backend call fails or the editor's reply
    /// cannot be extracted.
    pub async fn generate_content(
        &self,
        topic: &str,
        variant: ContentSchemaVariant,
    ) -> Result<ContentRecord, FailureRecord> {
        let context = self.record_context(topic.trim().to_string());
        tracing::info!(
            event = "content_started",
            topic = %context.topic,
            variant = ?variant,
            "content_started"
        );

        let result = async {
            let research = StepOutput {
                role: AgentRole::Researcher,
                text: self
                    .call(&PromptSpec::new(
                        AgentRole::Researcher,
                        format!("Research the topic: {topic}"),
                    ))
                    .await?,
            };

            let draft = StepOutput {
                role: AgentRole::Writer,
                text: self
                    .call(
                        &PromptSpec::new(
                            AgentRole::Writer,
                            format!("Write engaging content about {topic} based on the research"),
                        )
                        .with_context(vec![research.clone()]),
                    )
                    .await?,
            };

            let shape = RecordShape::Content(variant);
            let edit = PromptSpec::new(
                AgentRole::Editor,
                "Polish and refine the draft while ensuring accuracy. \
                 Return the full edited text.",
            )
            .with_context(vec![research, draft])
            .expecting(shape);

            self.finish(edit, shape, |raw| {
                self.engine.extract_content(raw, variant, &context)
            })
            .await
        }
        .await;

        result.map_err(|e| e.into_failure_record(&context))
    }

    fn record_context(&self, topic: String) -> RecordContext {
        let context = RecordContext::new(topic);
        match self.runner.model_name() {
            Some(model) => context.with_model(model),
            None => context,
        }
    }

    async fn call(&self, step: &PromptSpec) -> Result<String, CrewError> {
        let prompt_tokens = estimate_tokens(&step.render());
        tracing::debug!(
            event = "step_started",
            role = %step.role,
            prompt_tokens,
            "step_started"
        );

        let reply = self.runner.run_step(step).await.map_err(|e| {
            tracing::error!(event = "step_failed", role = %step.role, error = %e, "step_failed");
            CrewError::from(e)
        })?;

        tracing::debug!(
            event = "step_finished",
            role = %step.role,
            reply_tokens = estimate_tokens(&reply),
            "step_finished"
        );
        Ok(reply)
    }

    /// Issues the final step and extracts its reply, re-issuing it with feedback
    /// while attempts remain.
    async fn finish<T, F>(&self, mut step: PromptSpec, shape: RecordShape, extract: F) -> Result<T, CrewError>
    where
        F: Fn(&str) -> Result<T, FailureRecord>,
    {
        let max_attempts = self.config.requery_attempts.max(1);
        let mut attempt = 1;

        loop {
            let raw = self.call(&step).await?;
            let failure = match extract(&raw) {
                Ok(record) => {
                    tracing::info!(event = "record_extracted", role = %step.role, attempt, "record_extracted");
                    return Ok(record);
                }
                Err(failure) => failure,
            };

            if attempt >= max_attempts {
                return Err(CrewError::Extraction(Box::new(failure)));
            }

            let delay = self.config.backoff(attempt);
            tracing::warn!(
                event = "requery_scheduled",
                role = %step.role,
                attempt,
                max_attempts,
                kind = ?failure.kind,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "requery_scheduled"
            );

            let feedback = build_requery_feedback(
                &failure.error,
                &raw,
                attempt,
                max_attempts,
                &payload_schema(shape),
                self.config.extraction.snippet_chars,
            );
            step = step.with_feedback(feedback);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TransportError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::time::Duration;
    use tokio::sync::Mutex;
    use veracity_extract::FailureKind;

    struct Scripted {
        replies: Mutex<VecDeque<Result<String, TransportError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<&str, TransportError>>) -> Self {
            Self {
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .map(|reply| reply.map(str::to_string))
                        .collect(),
                ),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl StepRunner for Scripted {
        async fn run_step(&self, step: &PromptSpec) -> Result<String, TransportError> {
            self.prompts.lock().await.push(step.render());
            self.replies
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Backend("script exhausted".to_string())))
        }

        fn model_name(&self) -> Option<&str> {
            Some("scripted")
        }
    }

    fn quick_config(requery_attempts: usize) -> CrewConfig {
        CrewConfig {
            requery_attempts,
            backoff_base: Duration::from_millis(1),
            ..CrewConfig::default()
        }
    }

    #[tokio::test]
    async fn test_fact_check_threads_research() {
        let crew = ResearchCrew::new(
            Scripted::new(vec![
                Ok("Apollo 11 landed in 1969."),
                Ok("{\"score\": 97, \"details\": \"Well documented\"}"),
            ]),
            quick_config(1),
        );

        let record = crew.run_fact_check("Humans landed on the moon in 1969").await.unwrap();
        assert!((record.score - 97.0).abs() < f64::EPSILON);
        assert_eq!(record.details, "Veracity Score: 97 - Well documented");

        let prompts = crew.runner.prompts.lock().await;
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("Researcher: Apollo 11 landed in 1969."));
        assert!(prompts[1].contains("Respond with a single JSON object"));
    }

    #[tokio::test]
    async fn test_requery_recovers_from_bad_reply() {
        let crew = ResearchCrew::new(
            Scripted::new(vec![
                Ok("notes"),
                Ok("I'd rather not."),
                Ok("{\"score\": 10, \"details\": \"Fabricated\"}"),
            ]),
            quick_config(2),
        );

        let record = crew.run_fact_check("claim").await.unwrap();
        assert_eq!(record.details, "Veracity Score: 10 - Fabricated");

        let prompts = crew.runner.prompts.lock().await;
        assert_eq!(prompts.len(), 3);
        assert!(prompts[2].contains("Attempt 1/2"));
        assert!(prompts[2].contains("I'd rather not."));
    }

    #[tokio::test]
    async fn test_extraction_failure_without_requery() {
        let crew = ResearchCrew::new(
            Scripted::new(vec![Ok("notes"), Ok("{\"verdict\": \"true\"}")]),
            quick_config(1),
        );

        let failure = crew.run_fact_check("claim").await.unwrap_err();
        assert_eq!(failure.kind, FailureKind::MissingField);
        assert_eq!(failure.metadata.topic, "claim");
    }

    #[tokio::test]
    async fn test_transport_error_is_not_retried() {
        let crew = ResearchCrew::new(
            Scripted::new(vec![
                Ok("research"),
                Ok("draft"),
                Err(TransportError::Timeout(Duration::from_secs(5))),
                Ok("{\"content\": \"never used\"}"),
            ]),
            quick_config(3),
        );

        let failure = crew
            .generate_content("tides", ContentSchemaVariant::Plain)
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::Transport);
        assert_eq!(crew.runner.prompts.lock().await.len(), 3);
    }

    #[tokio::test]
    async fn test_generate_content_records_model() {
        let crew = ResearchCrew::new(
            Scripted::new(vec![
                Ok("research"),
                Ok("draft"),
                Ok("```json\n{\"content\": \"Tides rise twice daily.\", \"structure\": [\"Intro\"], \"word_count\": 4}\n```"),
            ]),
            quick_config(1),
        );

        let record = crew
            .generate_content("tides", ContentSchemaVariant::Factual)
            .await
            .unwrap();
        assert_eq!(record.metadata.word_count, 4);
        assert_eq!(record.metadata.model_used.as_deref(), Some("scripted"));
        assert_eq!(record.metadata.topic, "tides");

        let prompts = crew.runner.prompts.lock().await;
        assert!(prompts[2].contains("Researcher: research"));
        assert!(prompts[2].contains("Content Writer: draft"));
    }
}
