//! Provider trait for completion implementations

use std::time::Duration;

use async_trait::async_trait;

use super::{
    error::CompletionError,
    types::{CompletionRequest, Model},
};
use crate::llm::anthropic::AnthropicClient;
use crate::llm::openai::OpenAiClient;

/// Interface every language-model backend must satisfy
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate text for a single prompt
    ///
    /// Makes exactly one upstream request; no retries.
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;
}

/// Create a completion provider from a model specification
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use chat_relay::llm::{create_provider, Model};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = create_provider(
///     Model::OpenAi("gpt-4o-mini".to_string()),
///     "sk-...".to_string(),
///     Duration::from_secs(60),
/// )?;
/// # Ok(())
/// # }
/// ```
pub fn create_provider(
    model: Model,
    api_key: String,
    timeout: Duration,
) -> Result<Box<dyn CompletionProvider>, CompletionError> {
    if api_key.trim().is_empty() {
        return Err(CompletionError::AuthenticationError(format!(
            "no API key configured for {}",
            model.provider()
        )));
    }

    match model {
        Model::OpenAi(id) => Ok(Box::new(OpenAiClient::new(api_key, id, timeout)?)),
        Model::Anthropic(id) => Ok(Box::new(AnthropicClient::new(api_key, id, timeout)?)),
    }
}
