//! Forward-only schema migrations
//!
//! There is a single migration. It is recorded in `schema_migrations` and
//! guarded by `IF NOT EXISTS`, so running it on every start is safe.

use deadpool_postgres::Pool;
use tracing::info;

use crate::store::error::Result;

/// Identifier recorded once the initial schema has been applied
pub const INITIAL_MIGRATION: &str = "001_initial";

const INITIAL_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS schema_migrations (
        version     TEXT PRIMARY KEY,
        applied_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    );

    CREATE TABLE IF NOT EXISTS users (
        user_id     UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        username    VARCHAR(255) NOT NULL,
        email       VARCHAR(255) NOT NULL UNIQUE,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    );

    CREATE TABLE IF NOT EXISTS chats (
        chat_id     UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        user_id     UUID NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    );

    CREATE INDEX IF NOT EXISTS idx_chats_user
        ON chats(user_id, created_at);

    CREATE TABLE IF NOT EXISTS messages (
        message_id    UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        chat_id       UUID NOT NULL REFERENCES chats(chat_id) ON DELETE CASCADE,
        user_id       UUID NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
        content       TEXT NOT NULL,
        user_message  BOOLEAN NOT NULL,
        timestamp     TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
    );

    CREATE INDEX IF NOT EXISTS idx_messages_chat
        ON messages(chat_id, timestamp);

    CREATE TABLE IF NOT EXISTS logs (
        log_id      UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        user_id     UUID NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
        chat_id     UUID NOT NULL REFERENCES chats(chat_id) ON DELETE CASCADE,
        action      VARCHAR(255) NOT NULL,
        details     TEXT,
        timestamp   TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
    );

    CREATE INDEX IF NOT EXISTS idx_logs_chat
        ON logs(chat_id, timestamp);
";

/// Apply the schema if it hasn't been applied yet
pub async fn run(pool: &Pool) -> Result<()> {
    let mut conn = pool.get().await?;
    let txn = conn.transaction().await?;

    txn.batch_execute(INITIAL_SCHEMA).await?;

    let inserted = txn
        .execute(
            "INSERT INTO schema_migrations (version) VALUES ($1) ON CONFLICT DO NOTHING",
            &[&INITIAL_MIGRATION],
        )
        .await?;

    txn.commit().await?;

    if inserted > 0 {
        info!(version = INITIAL_MIGRATION, "Applied database migration");
    }
    Ok(())
}
