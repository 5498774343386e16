//! The seam between a crew and whatever answers its prompts.

use std::time::Duration;

use async_trait::async_trait;
use rig::completion::Prompt;

use crate::errors::TransportError;
use crate::prompt::PromptSpec;

/// Issues one model call per step.
///
/// Implementations own the network concerns: authentication, timeouts, transport
/// retries. A crew treats every [`TransportError`] as fatal.
#[async_trait]
pub trait StepRunner: Send + Sync {
    /// Runs `step` and returns the model's raw reply.
    async fn run_step(&self, step: &PromptSpec) -> Result<String, TransportError>;

    /// Name of the backing model, stamped into content metadata.
    fn model_name(&self) -> Option<&str> {
        None
    }
}

#[async_trait]
impl<T: StepRunner + ?Sized> StepRunner for Box<T> {
    async fn run_step(&self, step: &PromptSpec) -> Result<String, TransportError> {
        (**self).run_step(step).await
    }

    fn model_name(&self) -> Option<&str> {
        (**self).model_name()
    }
}

/// A [`StepRunner`] over any Rig agent.
pub struct RigRunner<A> {
    agent: A,
    model: String,
    timeout: Duration,
}

impl<A> RigRunner<A> {
    /// Wraps `agent`, recording `model` as its name and bounding each call by `timeout`.
    #[must_use]
    pub fn new(agent: A, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent,
            model: model.into(),
            timeout,
        }
    }
}

#[async_trait]
impl<A> StepRunner for RigRunner<A>
where
    A: Prompt + Send + Sync,
{
    async fn run_step(&self, step: &PromptSpec) -> Result<String, TransportError> {
        let prompt = step.render();
        let call = async { self.agent.prompt(prompt).await };

        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(e)) => Err(TransportError::Backend(e.to_string())),
            Err(_) => Err(TransportError::Timeout(self.timeout)),
        }
    }

    fn model_name(&self) -> Option<&str> {
        Some(&self.model)
    }
}
