//! The persistence gateway trait
//!
//! The relay and the HTTP handlers only ever talk to `dyn Store`, which keeps
//! the Postgres client swappable with the in-memory store in tests.

use async_trait::async_trait;
use uuid::Uuid;

use super::error::Result;
use super::types::{Chat, ChatHistory, Log, Message, NewChat, NewLog, NewMessage, NewUser, User};

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap round trip used by health checks and startup
    async fn ping(&self) -> Result<()>;

    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>>;

    /// Number of registered users, used to decide whether to seed
    async fn count_users(&self) -> Result<i64>;

    /// Fails with `ForeignKeyViolation` if the owning user doesn't exist
    async fn create_chat(&self, chat: NewChat) -> Result<Chat>;

    async fn get_chat(&self, chat_id: Uuid) -> Result<Option<Chat>>;

    /// Chats owned by a user, newest first
    async fn list_user_chats(&self, user_id: Uuid) -> Result<Vec<Chat>>;

    /// The chat plus its messages ordered by timestamp ascending
    async fn get_chat_history(&self, chat_id: Uuid) -> Result<Option<ChatHistory>>;

    /// Fails with `ForeignKeyViolation` if the chat or user doesn't exist
    async fn create_message(&self, message: NewMessage) -> Result<Message>;

    async fn create_log(&self, log: NewLog) -> Result<Log>;

    /// Audit rows for a chat ordered by timestamp ascending
    async fn list_chat_logs(&self, chat_id: Uuid) -> Result<Vec<Log>>;
}
