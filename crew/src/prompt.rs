//! Renders one crew step into a prompt, with earlier outputs threaded in.

use std::fmt::Write;

use serde_json::Value;
use veracity_extract::schema::{example_payload, payload_schema};
use veracity_extract::RecordShape;

use crate::roles::AgentRole;

/// Output of an earlier step, threaded into later prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutput {
    /// Who produced it.
    pub role: AgentRole,
    /// What they replied.
    pub text: String,
}

/// Everything needed to issue one model call.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSpec {
    /// The acting role.
    pub role: AgentRole,
    /// The task for this step.
    pub task: String,
    /// Outputs of earlier steps, oldest first.
    pub context: Vec<StepOutput>,
    /// Record shape the reply must encode, if this step is extracted.
    pub output: Option<RecordShape>,
    /// Feedback on earlier rejected replies to this same step.
    pub feedback: Vec<String>,
}

impl PromptSpec {
    /// A step with no context and free-text output.
    #[must_use]
    pub fn new(role: AgentRole, task: impl Into<String>) -> Self {
        Self {
            role,
            task: task.into(),
            context: Vec::new(),
            output: None,
            feedback: Vec::new(),
        }
    }

    /// Threads earlier outputs into this step.
    #[must_use]
    pub fn with_context(mut self, context: Vec<StepOutput>) -> Self {
        self.context = context;
        self
    }

    /// Requires a JSON-only reply of the given shape.
    #[must_use]
    pub const fn expecting(mut self, shape: RecordShape) -> Self {
        self.output = Some(shape);
        self
    }

    /// Appends feedback about a rejected reply.
    #[must_use]
    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback.push(feedback.into());
        self
    }

    /// Formats the step into a single prompt string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut prompt_str = String::new();

        let _ = write!(
            prompt_str,
            "System: You are the {}. Goal: {}. Background: {}.\n\n",
            self.role.title(),
            self.role.goal(),
            self.role.backstory()
        );

        if !self.context.is_empty() {
            prompt_str.push_str("Context from earlier steps:\n");
            for step in &self.context {
                let _ = writeln!(prompt_str, "{}: {}", step.role.title(), step.text.trim());
            }
            prompt_str.push('\n');
        }

        let _ = writeln!(prompt_str, "Task: {}", self.task);

        if let Some(shape) = self.output {
            let _ = write!(
                prompt_str,
                "\nRespond with a single JSON object and nothing else: no prose, no code fences.\n\
                 Schema:\n{}\nExample:\n{}\n",
                pretty(&payload_schema(shape)),
                pretty(&example_payload(shape))
            );
        }

        for feedback in &self.feedback {
            let _ = write!(prompt_str, "\n{feedback}\n");
        }

        prompt_str
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
