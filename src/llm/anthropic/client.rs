//! Anthropic client implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::llm::core::{
    error::{parse_retry_after, CompletionError},
    provider::CompletionProvider,
    types::CompletionRequest,
};

use super::types::{to_anthropic_request, ErrorEnvelope, MessagesResponse, ANTHROPIC_VERSION};

/// Public API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Client for the Anthropic Messages API
pub struct AnthropicClient {
    /// HTTP client for making requests
    http_client: Client,
    /// API key sent as `x-api-key`
    api_key: String,
    /// Scheme and host, without trailing slash
    base_url: String,
    /// Model to use
    model: String,
}

impl AnthropicClient {
    /// Create a new Anthropic client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .build()
            .map_err(|e| CompletionError::HttpError {
                status: 0,
                body: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
        })
    }

    /// Point the client at a different host (builder pattern)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the endpoint URL
    fn build_endpoint_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

#[async_trait]
impl CompletionProvider for AnthropicClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let body = to_anthropic_request(&self.model, request);

        let response = self
            .http_client
            .post(self.build_endpoint_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        // Check status
        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let text = response.text().await.unwrap_or_default();
            let (code, body) = match serde_json::from_str::<ErrorEnvelope>(&text) {
                Ok(envelope) => (Some(envelope.error.error_type), envelope.error.message),
                Err(_) => (None, text),
            };
            return Err(CompletionError::from_status(status.as_u16(), retry_after, code, body));
        }

        let message: MessagesResponse = response.json().await?;
        debug!(model = %self.model, id = ?message.id, stop_reason = ?message.stop_reason, "Received completion");

        message.into_text().ok_or(CompletionError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_format() {
        let client = AnthropicClient::new("key", "claude-haiku-4-5", Duration::from_secs(5)).unwrap();
        assert_eq!(client.build_endpoint_url(), "https://api.anthropic.com/v1/messages");
    }
}
