//! OpenAI Chat Completions request and response types

use serde::{Deserialize, Serialize};

use crate::llm::core::types::{is_reasoning_model, CompletionRequest};

/// Request body for `POST /v1/chat/completions`
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Replaces `max_tokens` for the o-series reasoning models
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub stream: bool,
}

/// One message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system", "user" or "assistant"
    pub role: String,
    /// Absent when the model returns only tool calls or a refusal
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatMessage {
    fn new(role: &str, content: String) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content),
        }
    }
}

/// Response body of a non-streaming completion
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Error envelope: `{"error": {"message": ..., "type": ..., "code": ...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Convert an abstract request into the OpenAI wire format
pub fn to_openai_request(model: &str, request: CompletionRequest) -> ChatCompletionRequest {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = request.system {
        messages.push(ChatMessage::new("system", system));
    }
    messages.push(ChatMessage::new("user", request.prompt));

    let max_tokens = request.config.max_tokens;
    if is_reasoning_model(model) {
        // Reasoning models reject `max_tokens` and any non-default temperature
        ChatCompletionRequest {
            model: model.to_string(),
            messages,
            max_tokens: None,
            max_completion_tokens: Some(max_tokens),
            temperature: None,
            stream: false,
        }
    } else {
        ChatCompletionRequest {
            model: model.to_string(),
            messages,
            max_tokens: Some(max_tokens),
            max_completion_tokens: None,
            temperature: request.config.temperature,
            stream: false,
        }
    }
}

impl ChatCompletionResponse {
    /// Text of the first choice, if any
    pub fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
    }
}
