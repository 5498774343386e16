//! Rig provider clients for each supported [`ModelType`].

use std::time::Duration;

use rig::client::{CompletionClient, ProviderClient};
use rig::providers::{deepseek, openai, xai};

use crate::errors::CrewError;
use crate::router::ModelType;
use crate::runner::{RigRunner, StepRunner};

/// Preamble shared by every agent; the role itself travels in each prompt.
const PREAMBLE: &str = "You are one member of a research crew. Follow the role and task \
                        given in each message exactly, including any output format.";

/// Builds a runner for `model` from environment credentials.
///
/// # Errors
///
/// Returns `CrewError::Config` when the provider's API key variable is unset or empty.
pub fn build_runner(model: ModelType, timeout: Duration) -> Result<Box<dyn StepRunner>, CrewError> {
    let key_var = model.api_key_env();
    if std::env::var(key_var).map_or(true, |key| key.trim().is_empty()) {
        return Err(CrewError::Config(format!(
            "{model} backend selected but {key_var} is not set"
        )));
    }

    let id = model.model_id();
    tracing::info!(event = "backend_selected", model = %model, model_id = id, "backend_selected");

    let runner: Box<dyn StepRunner> = match model {
        ModelType::OpenAi => {
            let agent = openai::Client::from_env().agent(id).preamble(PREAMBLE).build();
            Box::new(RigRunner::new(agent, id, timeout))
        }
        ModelType::DeepSeek => {
            let agent = deepseek::Client::from_env().agent(id).preamble(PREAMBLE).build();
            Box::new(RigRunner::new(agent, id, timeout))
        }
        ModelType::Grok => {
            let agent = xai::Client::from_env().agent(id).preamble(PREAMBLE).build();
            Box::new(RigRunner::new(agent, id, timeout))
        }
    };

    Ok(runner)
}
