use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A chat owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub chat_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A single chat message, either user-authored or assistant-authored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: Uuid,
    pub chat_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    /// `true` for user-authored messages, `false` for generated replies
    pub user_message: bool,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Role label used by the history endpoint
    pub fn role(&self) -> &'static str {
        if self.user_message {
            "user"
        } else {
            "assistant"
        }
    }
}

/// Append-only audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Log {
    pub log_id: Uuid,
    pub user_id: Uuid,
    pub chat_id: Uuid,
    pub action: String,
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// A chat together with its messages in timestamp order
#[derive(Debug, Clone, PartialEq)]
pub struct ChatHistory {
    pub chat: Chat,
    pub messages: Vec<Message>,
}

/// Fields for creating a user
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
}

impl NewUser {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
        }
    }
}

/// Fields for creating a chat
#[derive(Debug, Clone, Copy)]
pub struct NewChat {
    pub user_id: Uuid,
}

/// Fields for creating a message
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub chat_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub user_message: bool,
}

impl NewMessage {
    /// An inbound, user-authored message
    pub fn inbound(chat_id: Uuid, user_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            chat_id,
            user_id,
            content: content.into(),
            user_message: true,
        }
    }

    /// An outbound, assistant-authored reply
    pub fn outbound(chat_id: Uuid, user_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            chat_id,
            user_id,
            content: content.into(),
            user_message: false,
        }
    }
}

/// Fields for creating an audit log entry
#[derive(Debug, Clone)]
pub struct NewLog {
    pub user_id: Uuid,
    pub chat_id: Uuid,
    pub action: String,
    pub details: Option<String>,
}

impl NewLog {
    pub fn new(user_id: Uuid, chat_id: Uuid, action: impl Into<String>) -> Self {
        Self {
            user_id,
            chat_id,
            action: action.into(),
            details: None,
        }
    }

    /// Set the free-text details (builder pattern)
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
