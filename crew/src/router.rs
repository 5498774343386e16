//! Backend model selection.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Supported backend models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    /// OpenAI GPT-4o.
    #[value(name = "openai")]
    OpenAi,
    /// DeepSeek chat.
    #[value(name = "deepseek")]
    DeepSeek,
    /// xAI Grok.
    #[value(name = "grok")]
    Grok,
}

impl ModelType {
    /// Provider-side model identifier.
    #[must_use]
    pub const fn model_id(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o",
            Self::DeepSeek => "deepseek-chat",
            Self::Grok => "grok-2-latest",
        }
    }

    /// Environment variable holding the provider's API key.
    #[must_use]
    pub const fn api_key_env(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::DeepSeek => "DEEPSEEK_API_KEY",
            Self::Grok => "XAI_API_KEY",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OpenAi => "openai",
            Self::DeepSeek => "deepseek",
            Self::Grok => "grok",
        })
    }
}

/// How thorough the research step should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResearchDepth {
    /// Quick lookups.
    Shallow,
    /// The default.
    #[default]
    Medium,
    /// Long-form research.
    Deep,
}

impl FromStr for ResearchDepth {
    type Err = std::convert::Infallible;

    /// Unknown depths fall back to [`ResearchDepth::Medium`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "shallow" => Self::Shallow,
            "deep" => Self::Deep,
            _ => Self::Medium,
        })
    }
}

/// Picks the backend for a research depth.
#[must_use]
pub const fn select_model(depth: ResearchDepth) -> ModelType {
    match depth {
        ResearchDepth::Shallow | ResearchDepth::Medium => ModelType::OpenAi,
        ResearchDepth::Deep => ModelType::DeepSeek,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_model() {
        assert_eq!(select_model(ResearchDepth::Shallow), ModelType::OpenAi);
        assert_eq!(select_model(ResearchDepth::Medium), ModelType::OpenAi);
        assert_eq!(select_model(ResearchDepth::Deep), ModelType::DeepSeek);
    }

    #[test]
    fn test_unknown_depth_defaults_to_medium() {
        assert_eq!("DEEP".parse::<ResearchDepth>(), Ok(ResearchDepth::Deep));
        assert_eq!("bottomless".parse::<ResearchDepth>(), Ok(ResearchDepth::Medium));
        assert_eq!(
            select_model("".parse().unwrap_or_default()),
            ModelType::OpenAi
        );
    }

    #[test]
    fn test_model_metadata() {
        assert_eq!(ModelType::Grok.api_key_env(), "XAI_API_KEY");
        assert_eq!(ModelType::DeepSeek.to_string(), "deepseek");
        assert_eq!(ModelType::OpenAi.model_id(), "gpt-4o");
    }
}
