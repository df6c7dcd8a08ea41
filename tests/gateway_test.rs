use std::time::Duration;

use chat_relay::delivery::{ChatDelivery, DeliveryError, StreamChatClient};
use chat_relay::llm::anthropic::AnthropicClient;
use chat_relay::llm::openai::OpenAiClient;
use chat_relay::llm::{CompletionError, CompletionProvider, CompletionRequest};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// OpenAI
// ============================================================================

fn openai(server: &MockServer) -> OpenAiClient {
    OpenAiClient::new("sk-test", "gpt-4o-mini", TIMEOUT)
        .unwrap()
        .with_base_url(server.uri())
}

#[tokio::test]
async fn test_openai_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "hi"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "hello back"}, "finish_reason": "stop"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = CompletionRequest::new("hi").with_system(Some("be brief".to_string()));
    let text = openai(&server).complete(request).await.unwrap();

    assert_eq!(text, "hello back");
}

#[tokio::test]
async fn test_openai_rejected_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error", "code": "invalid_api_key"}
        })))
        .mount(&server)
        .await;

    let err = openai(&server).complete(CompletionRequest::new("hi")).await.unwrap_err();
    assert!(matches!(err, CompletionError::AuthenticationError(msg) if msg.contains("Incorrect API key")));
}

#[tokio::test]
async fn test_openai_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "2"))
        .mount(&server)
        .await;

    let err = openai(&server).complete(CompletionRequest::new("hi")).await.unwrap_err();
    assert!(matches!(
        err,
        CompletionError::RateLimitExceeded { retry_after: Some(d) } if d == Duration::from_secs(2)
    ));
}

#[tokio::test]
async fn test_openai_server_error_with_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"message": "The server had an error", "type": "server_error", "code": null}
        })))
        .mount(&server)
        .await;

    let err = openai(&server).complete(CompletionRequest::new("hi")).await.unwrap_err();
    assert!(matches!(err, CompletionError::ProviderError { code, .. } if code == "server_error"));
}

#[tokio::test]
async fn test_openai_empty_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": ""}}]
        })))
        .mount(&server)
        .await;

    let err = openai(&server).complete(CompletionRequest::new("hi")).await.unwrap_err();
    assert!(matches!(err, CompletionError::EmptyResponse));
}

// ============================================================================
// Anthropic
// ============================================================================

fn anthropic(server: &MockServer) -> AnthropicClient {
    AnthropicClient::new("sk-ant-test", "claude-haiku-4-5", TIMEOUT)
        .unwrap()
        .with_base_url(server.uri())
}

#[tokio::test]
async fn test_anthropic_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-haiku-4-5",
            "system": "be brief",
            "messages": [{"role": "user", "content": "hi"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": "hello back"}],
            "stop_reason": "end_turn"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = CompletionRequest::new("hi").with_system(Some("be brief".to_string()));
    let text = anthropic(&server).complete(request).await.unwrap();

    assert_eq!(text, "hello back");
}

#[tokio::test]
async fn test_anthropic_overloaded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(529).set_body_json(json!({
            "type": "error",
            "error": {"type": "overloaded_error", "message": "Overloaded"}
        })))
        .mount(&server)
        .await;

    let err = anthropic(&server).complete(CompletionRequest::new("hi")).await.unwrap_err();
    assert!(matches!(
        err,
        CompletionError::ProviderError { code, message } if code == "overloaded_error" && message == "Overloaded"
    ));
}

// ============================================================================
// Stream Chat
// ============================================================================

fn stream(server: &MockServer) -> StreamChatClient {
    StreamChatClient::new("key", "secret")
        .unwrap()
        .with_base_url(server.uri())
}

#[tokio::test]
async fn test_stream_ensure_channel() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels/messaging/chat-1/query"))
        .and(query_param("api_key", "key"))
        .and(header("stream-auth-type", "jwt"))
        .and(body_partial_json(json!({
            "data": {"members": ["user-1", "ai_assistant"], "created_by_id": "user-1"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"channel": {"id": "chat-1"}})))
        .expect(1)
        .mount(&server)
        .await;

    stream(&server)
        .ensure_channel("chat-1", &["user-1".to_string(), "ai_assistant".to_string()])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_stream_publish() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels/messaging/chat-1/message"))
        .and(body_partial_json(json!({
            "message": {"text": "hello back", "user_id": "ai_assistant"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": {"id": "m1"}})))
        .expect(1)
        .mount(&server)
        .await;

    stream(&server)
        .publish("chat-1", "hello back", "ai_assistant")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_stream_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("{\"message\":\"not allowed\"}"))
        .mount(&server)
        .await;

    let err = stream(&server)
        .publish("chat-1", "hi", "user-1")
        .await
        .unwrap_err();
    assert!(matches!(err, DeliveryError::HttpError { status: 403, .. }));
}
