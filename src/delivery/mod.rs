//! Chat-delivery gateway
//!
//! Pushes relay traffic into an external chat service so connected clients
//! see it in real time. The relay treats every call here as a notification:
//! failures are logged by the caller and never change the relay outcome.

pub mod stream;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

pub use stream::StreamChatClient;

/// Chat-delivery failure
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Chat service returned HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("Failed to sign server token: {0}")]
    TokenError(String),

    #[error("Transport error: {0}")]
    TransportError(String),
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        DeliveryError::TransportError(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for DeliveryError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        DeliveryError::TokenError(err.to_string())
    }
}

#[async_trait]
pub trait ChatDelivery: Send + Sync {
    /// Create the channel for a chat if needed and make sure `member_ids` belong to it
    async fn ensure_channel(&self, chat_id: &str, member_ids: &[String]) -> Result<(), DeliveryError>;

    /// Post `text` to the chat's channel as `author_id`
    async fn publish(&self, chat_id: &str, text: &str, author_id: &str) -> Result<(), DeliveryError>;
}

/// Gateway used when no chat-service credentials are configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDelivery;

#[async_trait]
impl ChatDelivery for NoopDelivery {
    async fn ensure_channel(&self, chat_id: &str, _member_ids: &[String]) -> Result<(), DeliveryError> {
        debug!(chat_id, "Chat delivery disabled, skipping channel setup");
        Ok(())
    }

    async fn publish(&self, chat_id: &str, _text: &str, _author_id: &str) -> Result<(), DeliveryError> {
        debug!(chat_id, "Chat delivery disabled, skipping publish");
        Ok(())
    }
}
