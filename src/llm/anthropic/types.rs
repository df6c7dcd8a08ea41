//! Anthropic Messages API request and response types

use serde::{Deserialize, Serialize};

use crate::llm::core::types::CompletionRequest;

/// API version header value
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Request body for `POST /v1/messages`
#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    /// Maximum number of tokens to generate (required)
    pub max_tokens: u32,
    pub messages: Vec<AnthropicMessage>,
    /// System prompt (top-level field)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A single message in the conversation
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicMessage {
    /// Role: "user" or "assistant"
    pub role: String,
    pub content: String,
}

/// Response body of a non-streaming request
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub content: Vec<ResponseBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

/// A content block within the response
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Error body: `{"type": "error", "error": {"type": ..., "message": ...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

/// Convert an abstract request into the Anthropic wire format
pub fn to_anthropic_request(model: &str, request: CompletionRequest) -> MessagesRequest {
    MessagesRequest {
        model: model.to_string(),
        max_tokens: request.config.max_tokens,
        messages: vec![AnthropicMessage {
            role: "user".to_string(),
            content: request.prompt,
        }],
        system: request.system,
        temperature: request.config.temperature,
    }
}

impl MessagesResponse {
    /// Concatenated text blocks, ignoring any non-text content
    pub fn into_text(self) -> Option<String> {
        let text: String = self
            .content
            .into_iter()
            .filter_map(|block| match block {
                ResponseBlock::Text { text } => Some(text),
                ResponseBlock::Other => None,
            })
            .collect();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
