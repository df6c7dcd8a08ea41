use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::store::{
    error::Result,
    types::{Chat, ChatHistory, Log, Message, User},
};

pub(crate) fn parse_user_row(row: &Row) -> User {
    User {
        user_id: row.get("user_id"),
        username: row.get("username"),
        email: row.get("email"),
        created_at: row.get("created_at"),
    }
}

pub(crate) fn parse_chat_row(row: &Row) -> Chat {
    Chat {
        chat_id: row.get("chat_id"),
        user_id: row.get("user_id"),
        created_at: row.get("created_at"),
    }
}

pub(crate) fn parse_message_row(row: &Row) -> Message {
    Message {
        message_id: row.get("message_id"),
        chat_id: row.get("chat_id"),
        user_id: row.get("user_id"),
        content: row.get("content"),
        user_message: row.get("user_message"),
        timestamp: row.get("timestamp"),
    }
}

pub(crate) fn parse_log_row(row: &Row) -> Log {
    Log {
        log_id: row.get("log_id"),
        user_id: row.get("user_id"),
        chat_id: row.get("chat_id"),
        action: row.get("action"),
        details: row.get("details"),
        timestamp: row.get("timestamp"),
    }
}

/// Round trip to the database
pub async fn ping(pool: &Pool) -> Result<()> {
    let conn = pool.get().await?;
    conn.simple_query("SELECT 1").await?;
    Ok(())
}

pub async fn get_user(pool: &Pool, user_id: Uuid) -> Result<Option<User>> {
    let conn = pool.get().await?;

    let row = conn
        .query_opt(
            "SELECT user_id, username, email, created_at FROM users WHERE user_id = $1",
            &[&user_id],
        )
        .await?;

    Ok(row.as_ref().map(parse_user_row))
}

pub async fn count_users(pool: &Pool) -> Result<i64> {
    let conn = pool.get().await?;
    let row = conn.query_one("SELECT COUNT(*) FROM users", &[]).await?;
    Ok(row.get(0))
}

pub async fn get_chat(pool: &Pool, chat_id: Uuid) -> Result<Option<Chat>> {
    let conn = pool.get().await?;

    let row = conn
        .query_opt(
            "SELECT chat_id, user_id, created_at FROM chats WHERE chat_id = $1",
            &[&chat_id],
        )
        .await?;

    Ok(row.as_ref().map(parse_chat_row))
}

pub async fn list_user_chats(pool: &Pool, user_id: Uuid) -> Result<Vec<Chat>> {
    let conn = pool.get().await?;

    let rows = conn
        .query(
            "SELECT chat_id, user_id, created_at FROM chats \
             WHERE user_id = $1 ORDER BY created_at DESC",
            &[&user_id],
        )
        .await?;

    Ok(rows.iter().map(parse_chat_row).collect())
}

/// Load a chat and its messages
///
/// Both reads go through the same pooled connection. Messages are ordered by
/// timestamp; on a tie the user-authored message comes first.
pub async fn get_chat_history(pool: &Pool, chat_id: Uuid) -> Result<Option<ChatHistory>> {
    let conn = pool.get().await?;

    let chat = match conn
        .query_opt(
            "SELECT chat_id, user_id, created_at FROM chats WHERE chat_id = $1",
            &[&chat_id],
        )
        .await?
    {
        Some(row) => parse_chat_row(&row),
        None => return Ok(None),
    };

    let rows = conn
        .query(
            "SELECT message_id, chat_id, user_id, content, user_message, timestamp \
             FROM messages WHERE chat_id = $1 \
             ORDER BY messages.timestamp ASC, user_message DESC",
            &[&chat_id],
        )
        .await?;

    Ok(Some(ChatHistory {
        chat,
        messages: rows.iter().map(parse_message_row).collect(),
    }))
}

pub async fn list_chat_logs(pool: &Pool, chat_id: Uuid) -> Result<Vec<Log>> {
    let conn = pool.get().await?;

    let rows = conn
        .query(
            "SELECT log_id, user_id, chat_id, action, details, timestamp \
             FROM logs WHERE chat_id = $1 ORDER BY logs.timestamp ASC",
            &[&chat_id],
        )
        .await?;

    Ok(rows.iter().map(parse_log_row).collect())
}
