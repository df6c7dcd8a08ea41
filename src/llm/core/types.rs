//! Request and model types for the completion gateway

use std::fmt;
use std::str::FromStr;

use super::config::GenerationConfig;
use super::error::CompletionError;

/// A single-turn completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// The user's text
    pub prompt: String,
    /// Optional fixed system persona
    pub system: Option<String>,
    /// Generation parameters
    pub config: GenerationConfig,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            config: GenerationConfig::default(),
        }
    }

    /// Set the system persona (builder pattern)
    pub fn with_system(mut self, system: Option<String>) -> Self {
        self.system = system;
        self
    }

    /// Set the generation parameters (builder pattern)
    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }
}

/// Completion model, tagged with the provider that serves it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Model {
    /// OpenAI Chat Completions model (e.g. `gpt-4o-mini`)
    OpenAi(String),
    /// Anthropic Messages model (e.g. `claude-haiku-4-5`)
    Anthropic(String),
}

impl Model {
    /// Get the model identifier as a string
    pub fn as_str(&self) -> &str {
        match self {
            Model::OpenAi(id) | Model::Anthropic(id) => id,
        }
    }

    /// Provider name used in logs and config errors
    pub fn provider(&self) -> &'static str {
        match self {
            Model::OpenAi(_) => "openai",
            Model::Anthropic(_) => "anthropic",
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::OpenAi("gpt-4o-mini".to_string())
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider(), self.as_str())
    }
}

impl FromStr for Model {
    type Err = CompletionError;

    /// Select the provider from the model id prefix
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        if id.starts_with("claude-") {
            Ok(Model::Anthropic(id.to_string()))
        } else if id.starts_with("gpt-") || id.starts_with("chatgpt-") || is_reasoning_model(id) {
            Ok(Model::OpenAi(id.to_string()))
        } else {
            Err(CompletionError::InvalidRequest(format!("unknown model: {:?}", s)))
        }
    }
}

/// OpenAI's `o1`, `o3-mini`, ... family
pub(crate) fn is_reasoning_model(id: &str) -> bool {
    let mut chars = id.chars();
    chars.next() == Some('o') && chars.next().is_some_and(|c| c.is_ascii_digit())
}
