use deadpool_postgres::Pool;

use crate::store::{
    error::Result,
    operations::read::{parse_chat_row, parse_log_row, parse_message_row, parse_user_row},
    types::{Chat, Log, Message, NewChat, NewLog, NewMessage, NewUser, User},
};

/// Insert a user and return the stored row
///
/// # Errors
///
/// * `Error::UniqueViolation` - If another user already has the same email
/// * `Error::DatabaseError` - For database connection or SQL errors
pub async fn create_user(pool: &Pool, user: NewUser) -> Result<User> {
    let conn = pool.get().await?;

    let row = conn
        .query_one(
            "INSERT INTO users (username, email) VALUES ($1, $2) \
             RETURNING user_id, username, email, created_at",
            &[&user.username, &user.email],
        )
        .await?;

    Ok(parse_user_row(&row))
}

/// Insert a chat owned by `chat.user_id`
///
/// # Errors
///
/// * `Error::ForeignKeyViolation` - If the user doesn't exist
pub async fn create_chat(pool: &Pool, chat: NewChat) -> Result<Chat> {
    let conn = pool.get().await?;

    let row = conn
        .query_one(
            "INSERT INTO chats (user_id) VALUES ($1) RETURNING chat_id, user_id, created_at",
            &[&chat.user_id],
        )
        .await?;

    Ok(parse_chat_row(&row))
}

/// Insert a message
///
/// The database assigns `message_id` and `timestamp`. The insert runs in
/// autocommit mode, so the row is durable once this returns.
///
/// # Errors
///
/// * `Error::ForeignKeyViolation` - If the chat or user doesn't exist
/// * `Error::DatabaseError` - For database connection or SQL errors
pub async fn create_message(pool: &Pool, message: NewMessage) -> Result<Message> {
    let conn = pool.get().await?;

    let row = conn
        .query_one(
            "INSERT INTO messages (chat_id, user_id, content, user_message) \
             VALUES ($1, $2, $3, $4) \
             RETURNING message_id, chat_id, user_id, content, user_message, timestamp",
            &[
                &message.chat_id,
                &message.user_id,
                &message.content,
                &message.user_message,
            ],
        )
        .await?;

    Ok(parse_message_row(&row))
}

/// Append an audit log entry
pub async fn create_log(pool: &Pool, log: NewLog) -> Result<Log> {
    let conn = pool.get().await?;

    let row = conn
        .query_one(
            "INSERT INTO logs (user_id, chat_id, action, details) \
             VALUES ($1, $2, $3, $4) \
             RETURNING log_id, user_id, chat_id, action, details, timestamp",
            &[&log.user_id, &log.chat_id, &log.action, &log.details],
        )
        .await?;

    Ok(parse_log_row(&row))
}
