//! Crew configuration.

use std::time::Duration;

use veracity_extract::ExtractionConfig;

use crate::router::{select_model, ModelType, ResearchDepth};

/// Configuration for a [`ResearchCrew`](crate::ResearchCrew).
///
/// Passed explicitly to every crew; there is no process-wide client or setting.
#[derive(Debug, Clone)]
pub struct CrewConfig {
    /// Research depth, used to pick a model when none is forced.
    pub depth: ResearchDepth,

    /// Forced backend model (None = pick from `depth`).
    pub model: Option<ModelType>,

    /// Maximum time for one backend call.
    ///
    /// Default: 120 seconds
    pub timeout: Duration,

    /// How many times the final step may be issued when its reply cannot be
    /// extracted. 1 disables re-query.
    pub requery_attempts: usize,

    /// Delay before the first re-query, doubled for each later one.
    ///
    /// Default: 500 milliseconds
    pub backoff_base: Duration,

    /// Extraction engine settings.
    pub extraction: ExtractionConfig,
}

impl Default for CrewConfig {
    fn default() -> Self {
        Self {
            depth: ResearchDepth::Medium,
            model: None,
            timeout: Duration::from_secs(120),
            requery_attempts: 1,
            backoff_base: Duration::from_millis(500),
            extraction: ExtractionConfig::default(),
        }
    }
}

impl CrewConfig {
    /// Create a new `CrewConfig` with default settings.
    ///
    /// Equivalent to `CrewConfig::default()`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The model this configuration resolves to.
    #[must_use]
    pub fn model_type(&self) -> ModelType {
        self.model.unwrap_or_else(|| select_model(self.depth))
    }

    /// Delay before re-query number `attempt` (1-based): `backoff_base * 2^(attempt-1)`.
    #[must_use]
    pub fn backoff(&self, attempt: usize) -> Duration {
        let exponent = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX).min(16);
        self.backoff_base.saturating_mul(1 << exponent)
    }
}
