//! In-memory persistence gateway
//!
//! Enforces the same foreign-key and uniqueness rules as the Postgres schema.
//! Used by the test suites and selected at startup by `DATABASE_URL=memory://`
//! for running the service without a database.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::store::{
    error::{Error, Result},
    gateway::Store,
    types::{Chat, ChatHistory, Log, Message, NewChat, NewLog, NewMessage, NewUser, User},
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    chats: HashMap<Uuid, Chat>,
    messages: Vec<Message>,
    logs: Vec<Log>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing clock so insertion order survives equal wall-clock reads
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(next);
        next
    }

    fn check_refs(&self, chat_id: Uuid, user_id: Uuid) -> Result<()> {
        if !self.users.contains_key(&user_id) {
            return Err(Error::ForeignKeyViolation(format!("user {} does not exist", user_id)));
        }
        if !self.chats.contains_key(&chat_id) {
            return Err(Error::ForeignKeyViolation(format!("chat {} does not exist", chat_id)));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| Error::DatabaseError("memory store lock poisoned".to_string()))
    }

    /// Every stored message, in insertion order
    pub fn messages(&self) -> Result<Vec<Message>> {
        Ok(self.lock()?.messages.clone())
    }

    /// Every stored audit entry, in insertion order
    pub fn logs(&self) -> Result<Vec<Log>> {
        Ok(self.lock()?.logs.clone())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<()> {
        self.lock().map(|_| ())
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.lock()?;

        if tables.users.values().any(|u| u.email == user.email) {
            return Err(Error::UniqueViolation(format!("email {} already registered", user.email)));
        }

        let record = User {
            user_id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            created_at: tables.tick(),
        };
        tables.users.insert(record.user_id, record.clone());
        Ok(record)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self.lock()?.users.get(&user_id).cloned())
    }

    async fn count_users(&self) -> Result<i64> {
        Ok(self.lock()?.users.len() as i64)
    }

    async fn create_chat(&self, chat: NewChat) -> Result<Chat> {
        let mut tables = self.lock()?;

        if !tables.users.contains_key(&chat.user_id) {
            return Err(Error::ForeignKeyViolation(format!("user {} does not exist", chat.user_id)));
        }

        let record = Chat {
            chat_id: Uuid::new_v4(),
            user_id: chat.user_id,
            created_at: tables.tick(),
        };
        tables.chats.insert(record.chat_id, record.clone());
        Ok(record)
    }

    async fn get_chat(&self, chat_id: Uuid) -> Result<Option<Chat>> {
        Ok(self.lock()?.chats.get(&chat_id).cloned())
    }

    async fn list_user_chats(&self, user_id: Uuid) -> Result<Vec<Chat>> {
        let tables = self.lock()?;
        let mut chats: Vec<Chat> = tables
            .chats
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        chats.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(chats)
    }

    async fn get_chat_history(&self, chat_id: Uuid) -> Result<Option<ChatHistory>> {
        let tables = self.lock()?;

        let Some(chat) = tables.chats.get(&chat_id).cloned() else {
            return Ok(None);
        };

        let mut messages: Vec<Message> = tables
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then(b.user_message.cmp(&a.user_message))
        });

        Ok(Some(ChatHistory { chat, messages }))
    }

    async fn create_message(&self, message: NewMessage) -> Result<Message> {
        let mut tables = self.lock()?;
        tables.check_refs(message.chat_id, message.user_id)?;

        let record = Message {
            message_id: Uuid::new_v4(),
            chat_id: message.chat_id,
            user_id: message.user_id,
            content: message.content,
            user_message: message.user_message,
            timestamp: tables.tick(),
        };
        tables.messages.push(record.clone());
        Ok(record)
    }

    async fn create_log(&self, log: NewLog) -> Result<Log> {
        let mut tables = self.lock()?;
        tables.check_refs(log.chat_id, log.user_id)?;

        let record = Log {
            log_id: Uuid::new_v4(),
            user_id: log.user_id,
            chat_id: log.chat_id,
            action: log.action,
            details: log.details,
            timestamp: tables.tick(),
        };
        tables.logs.push(record.clone());
        Ok(record)
    }

    async fn list_chat_logs(&self, chat_id: Uuid) -> Result<Vec<Log>> {
        Ok(self
            .lock()?
            .logs
            .iter()
            .filter(|l| l.chat_id == chat_id)
            .cloned()
            .collect())
    }
}
