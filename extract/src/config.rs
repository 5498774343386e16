//! Configuration for extraction behaviour.

/// How the boundary locator finds the candidate object inside prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryStrategy {
    /// Depth-tracking scan that ignores braces inside string literals.
    ///
    /// Falls back to [`BoundaryStrategy::Naive`] when an opening brace is
    /// never closed.
    #[default]
    Balanced,
    /// First `{` to last `}`.
    ///
    /// Known limitation: trailing prose that itself contains braces widens
    /// the candidate past the real object.
    Naive,
}

/// Configuration for a single [`ExtractionEngine`](crate::ExtractionEngine).
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Maximum number of parse attempts on a candidate (default: 3, minimum 1).
    pub max_parse_attempts: usize,
    /// Candidate location strategy (default: balanced).
    pub boundary: BoundaryStrategy,
    /// Number of leading/trailing characters of the raw reply logged on failure (default: 200).
    pub snippet_chars: usize,
    /// Whether every located candidate is traced at `debug` level (default: true).
    pub trace_candidates: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_parse_attempts: 3,
            boundary: BoundaryStrategy::Balanced,
            snippet_chars: 200,
            trace_candidates: true,
        }
    }
}

impl ExtractionConfig {
    /// Set the maximum number of parse attempts. Zero is raised to one.
    #[must_use]
    pub const fn with_max_parse_attempts(mut self, max: usize) -> Self {
        self.max_parse_attempts = if max == 0 { 1 } else { max };
        self
    }

    /// Set the boundary location strategy.
    #[must_use]
    pub const fn with_boundary(mut self, boundary: BoundaryStrategy) -> Self {
        self.boundary = boundary;
        self
    }

    /// Set how many characters of the raw reply are kept in failure logs.
    #[must_use]
    pub const fn with_snippet_chars(mut self, chars: usize) -> Self {
        self.snippet_chars = chars;
        self
    }

    /// Enable or disable candidate tracing.
    #[must_use]
    pub const fn with_candidate_tracing(mut self, enabled: bool) -> Self {
        self.trace_candidates = enabled;
        self
    }
}
