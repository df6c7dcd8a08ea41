//! Message relay
//!
//! Runs one inbound chat message through persistence, chat delivery and
//! completion. The same [`MessageRelay`] serves the HTTP handlers and the
//! queue worker.
//!
//! Steps run strictly in order and each is attempted once:
//!
//! 1. persist the inbound message (failure aborts)
//! 2. append the `send_message` audit row (best-effort)
//! 3. ensure the delivery channel and publish the inbound text (best-effort)
//! 4. request a completion
//! 5. on success persist the reply, audit it and publish it under the
//!    assistant identity; on failure echo the original content back with
//!    [`RelayStatus::PartialSuccess`]

pub mod error;
pub mod request;

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::delivery::ChatDelivery;
use crate::llm::{CompletionProvider, CompletionRequest, GenerationConfig};
use crate::store::{NewLog, NewMessage, Store};

pub use error::{GenerateError, RelayError};
pub use request::{RelayOutcome, RelayRequest, RelayStatus};

/// Audit action written for every accepted inbound message
pub const SEND_MESSAGE_ACTION: &str = "send_message";

/// Audit action written after a generated reply has been stored
pub const COMPLETION_FORWARDED_ACTION: &str = "completion_forwarded";

/// Characters of content kept in audit details and log previews
pub const PREVIEW_CHARS: usize = 50;

/// Tunables shared by every relay invocation
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Identity the reply is published under on the delivery channel
    pub assistant_id: String,
    /// Optional fixed system persona for completions
    pub persona: Option<String>,
    pub generation: GenerationConfig,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            assistant_id: "ai_assistant".to_string(),
            persona: None,
            generation: GenerationConfig::default(),
        }
    }
}

/// First [`PREVIEW_CHARS`] characters of `content`
pub fn preview(content: &str) -> String {
    content.chars().take(PREVIEW_CHARS).collect()
}

#[derive(Clone)]
pub struct MessageRelay {
    store: Arc<dyn Store>,
    delivery: Arc<dyn ChatDelivery>,
    completion: Arc<dyn CompletionProvider>,
    settings: RelaySettings,
}

impl MessageRelay {
    pub fn new(
        store: Arc<dyn Store>,
        delivery: Arc<dyn ChatDelivery>,
        completion: Arc<dyn CompletionProvider>,
        settings: RelaySettings,
    ) -> Self {
        Self {
            store,
            delivery,
            completion,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Relay one validated message
    ///
    /// Only a failure to persist the inbound message is surfaced. Audit and
    /// delivery failures are logged, and a completion failure degrades to
    /// [`RelayStatus::PartialSuccess`] without storing a reply.
    pub async fn send_message(&self, request: RelayRequest) -> Result<RelayOutcome, RelayError> {
        let RelayRequest {
            chat_id,
            user_id,
            content,
        } = request;

        let inbound = self
            .store
            .create_message(NewMessage::inbound(chat_id, user_id, content.clone()))
            .await
            .map_err(|e| {
                error!(%chat_id, %user_id, error = %e, "Failed to persist inbound message");
                RelayError::Persistence(e)
            })?;

        info!(
            %chat_id,
            %user_id,
            message_id = %inbound.message_id,
            preview = %preview(&content),
            "Stored inbound message"
        );

        self.audit(
            NewLog::new(user_id, chat_id, SEND_MESSAGE_ACTION)
                .with_details(format!("Message sent: {}...", preview(&content))),
        )
        .await;

        let chat_key = chat_id.to_string();
        let user_key = user_id.to_string();
        self.notify_channel(&chat_key, &user_key).await;
        self.notify(&chat_key, &content, &user_key).await;

        let completion = CompletionRequest::new(content.clone())
            .with_system(self.settings.persona.clone())
            .with_config(self.settings.generation.clone());

        let generated = match self.completion.complete(completion).await {
            Ok(text) => text,
            Err(e) => {
                warn!(%chat_id, %user_id, error = %e, "Completion failed, returning original content");
                return Ok(RelayOutcome {
                    status: RelayStatus::PartialSuccess,
                    message_id: inbound.message_id,
                    chat_id,
                    user_id,
                    content,
                    reply_id: None,
                });
            }
        };

        let reply_id = self.store_reply(chat_id, user_id, &generated).await;
        self.notify(&chat_key, &generated, &self.settings.assistant_id).await;

        Ok(RelayOutcome {
            status: RelayStatus::Success,
            message_id: inbound.message_id,
            chat_id,
            user_id,
            content: generated,
            reply_id,
        })
    }

    /// Generate a reply and post it to the chat channel, without persistence
    ///
    /// `chat_id` is the delivery channel key and need not be a UUID. Unlike
    /// [`MessageRelay::send_message`], a delivery failure here is surfaced.
    pub async fn generate_response(
        &self,
        user_id: &str,
        message: &str,
        chat_id: &str,
    ) -> Result<String, GenerateError> {
        for (field, value) in [("user_id", user_id), ("message", message), ("chat_id", chat_id)] {
            if value.trim().is_empty() {
                return Err(GenerateError::InvalidInput(format!("{} must not be empty", field)));
            }
        }

        info!(user_id, chat_id, "Generating response");

        let completion = CompletionRequest::new(message)
            .with_system(self.settings.persona.clone())
            .with_config(self.settings.generation.clone());
        let generated = self.completion.complete(completion).await?;

        self.delivery
            .ensure_channel(chat_id, &[user_id.to_string()])
            .await?;
        self.delivery.publish(chat_id, &generated, user_id).await?;

        Ok(generated)
    }

    /// Persist a generated reply and its audit row; a failed insert only costs the reply id
    async fn store_reply(&self, chat_id: Uuid, user_id: Uuid, generated: &str) -> Option<Uuid> {
        match self
            .store
            .create_message(NewMessage::outbound(chat_id, user_id, generated))
            .await
        {
            Ok(reply) => {
                self.audit(
                    NewLog::new(user_id, chat_id, COMPLETION_FORWARDED_ACTION)
                        .with_details(format!("Reply stored: {}...", preview(generated))),
                )
                .await;
                Some(reply.message_id)
            }
            Err(e) => {
                error!(%chat_id, %user_id, error = %e, "Failed to persist generated reply");
                None
            }
        }
    }

    async fn audit(&self, log: NewLog) {
        let action = log.action.clone();
        if let Err(e) = self.store.create_log(log).await {
            warn!(action = %action, error = %e, "Failed to write audit log");
        }
    }

    async fn notify_channel(&self, chat_id: &str, user_id: &str) {
        let members = [user_id.to_string(), self.settings.assistant_id.clone()];
        if let Err(e) = self.delivery.ensure_channel(chat_id, &members).await {
            warn!(chat_id, error = %e, "Failed to ensure delivery channel");
        }
    }

    async fn notify(&self, chat_id: &str, text: &str, author_id: &str) {
        if let Err(e) = self.delivery.publish(chat_id, text, author_id).await {
            warn!(chat_id, author_id, error = %e, "Failed to publish to delivery channel");
        }
    }
}
