// HTTP request and response bodies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{Chat, Log, Message, User};

// Request Types

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateChatRequest {
    /// Kept as a string so a malformed id is a 400, not a body error
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub chat_id: String,
    pub user_id: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub user_id: String,
    pub message: String,
    pub chat_id: String,
}

// Response Types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreatedResponse {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCreatedResponse {
    pub chat_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}

/// Error body for every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSummary {
    pub chat_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Chat> for ChatSummary {
    fn from(chat: Chat) -> Self {
        Self {
            chat_id: chat.chat_id,
            user_id: chat.user_id,
            created_at: chat.created_at,
        }
    }
}

/// One entry of a chat history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl From<Message> for HistoryEntry {
    fn from(message: Message) -> Self {
        Self {
            role: message.role().to_string(),
            content: message.content,
            timestamp: message.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub log_id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<Log> for LogEntry {
    fn from(log: Log) -> Self {
        Self {
            log_id: log.log_id,
            user_id: log.user_id,
            action: log.action,
            details: log.details,
            timestamp: log.timestamp,
        }
    }
}
