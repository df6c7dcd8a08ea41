mod common;

use chat_relay::store::{Error, NewChat, NewLog, NewMessage, NewUser, PgStore, Store, StoreConfig};
use testcontainers::clients::Cli;
use uuid::Uuid;

// Macro to set up test environment
// Note: This keeps _docker and _container alive for the duration of the test
macro_rules! setup_test {
    ($docker:ident, $container:ident, $store:ident) => {
        setup_test!($docker, $container, $store, _pool);
    };
    ($docker:ident, $container:ident, $store:ident, $pool:ident) => {
        let $docker = Cli::default();
        let $container = $docker.run(common::create_postgres_container());

        // Postgres restarts once after initdb, give it a moment
        tokio::time::sleep(tokio::time::Duration::from_secs(3)).await;

        let host_port = $container.get_host_port_ipv4(common::POSTGRES_PORT);
        let connection_string = common::build_connection_string("127.0.0.1", host_port);
        let config = StoreConfig::from_connection_string(&connection_string).unwrap();
        // Raw-SQL access alongside the store
        let $pool = config.build_pool().unwrap();
        let $store = PgStore::connect_with_retry(config, 5, std::time::Duration::from_secs(1))
            .await
            .unwrap();
        $store.migrate().await.unwrap();
    };
}

// ============================================================================
// schema
// ============================================================================

#[tokio::test]
async fn test_migrate_is_idempotent() {
    setup_test!(_docker, _container, store);

    store.migrate().await.unwrap();
    store.ping().await.unwrap();
    assert_eq!(store.count_users().await.unwrap(), 0);
}

// ============================================================================
// users and chats
// ============================================================================

#[tokio::test]
async fn test_create_and_get_user() {
    setup_test!(_docker, _container, store);

    let user = store
        .create_user(NewUser::new("ada", "ada@example.com"))
        .await
        .unwrap();

    let fetched = store.get_user(user.user_id).await.unwrap().unwrap();
    assert_eq!(fetched.username, "ada");
    assert_eq!(fetched.email, "ada@example.com");
    assert_eq!(store.count_users().await.unwrap(), 1);

    assert!(store.get_user(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_email_is_unique_violation() {
    setup_test!(_docker, _container, store);

    store
        .create_user(NewUser::new("ada", "ada@example.com"))
        .await
        .unwrap();
    let err = store
        .create_user(NewUser::new("ada2", "ada@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UniqueViolation(_)));
}

#[tokio::test]
async fn test_chat_requires_existing_user() {
    setup_test!(_docker, _container, store);

    let err = store
        .create_chat(NewChat {
            user_id: Uuid::new_v4(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ForeignKeyViolation(_)));
}

#[tokio::test]
async fn test_list_user_chats_newest_first() {
    setup_test!(_docker, _container, store);

    let user = store
        .create_user(NewUser::new("ada", "ada@example.com"))
        .await
        .unwrap();
    let first = store.create_chat(NewChat { user_id: user.user_id }).await.unwrap();
    tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
    let second = store.create_chat(NewChat { user_id: user.user_id }).await.unwrap();

    let chats = store.list_user_chats(user.user_id).await.unwrap();
    let ids: Vec<Uuid> = chats.iter().map(|c| c.chat_id).collect();
    assert_eq!(ids, vec![second.chat_id, first.chat_id]);

    assert_eq!(store.get_chat(first.chat_id).await.unwrap(), Some(first));
}

// ============================================================================
// messages and logs
// ============================================================================

#[tokio::test]
async fn test_chat_history_ordered() {
    setup_test!(_docker, _container, store);

    let user = store
        .create_user(NewUser::new("ada", "ada@example.com"))
        .await
        .unwrap();
    let chat = store.create_chat(NewChat { user_id: user.user_id }).await.unwrap();
    let other = store.create_chat(NewChat { user_id: user.user_id }).await.unwrap();

    store
        .create_message(NewMessage::inbound(chat.chat_id, user.user_id, "hi"))
        .await
        .unwrap();
    store
        .create_message(NewMessage::inbound(other.chat_id, user.user_id, "elsewhere"))
        .await
        .unwrap();
    store
        .create_message(NewMessage::outbound(chat.chat_id, user.user_id, "hello back"))
        .await
        .unwrap();

    let history = store.get_chat_history(chat.chat_id).await.unwrap().unwrap();
    assert_eq!(history.chat.chat_id, chat.chat_id);

    let roles: Vec<(&str, &str)> = history
        .messages
        .iter()
        .map(|m| (m.role(), m.content.as_str()))
        .collect();
    assert_eq!(roles, vec![("user", "hi"), ("assistant", "hello back")]);
    assert!(history.messages[0].timestamp <= history.messages[1].timestamp);

    assert!(store.get_chat_history(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_message_requires_existing_chat() {
    setup_test!(_docker, _container, store);

    let user = store
        .create_user(NewUser::new("ada", "ada@example.com"))
        .await
        .unwrap();
    let err = store
        .create_message(NewMessage::inbound(Uuid::new_v4(), user.user_id, "hi"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ForeignKeyViolation(_)));
}

#[tokio::test]
async fn test_logs_round_trip() {
    setup_test!(_docker, _container, store);

    let user = store
        .create_user(NewUser::new("ada", "ada@example.com"))
        .await
        .unwrap();
    let chat = store.create_chat(NewChat { user_id: user.user_id }).await.unwrap();

    store
        .create_log(NewLog::new(user.user_id, chat.chat_id, "send_message").with_details("Message sent: hi..."))
        .await
        .unwrap();
    store
        .create_log(NewLog::new(user.user_id, chat.chat_id, "completion_forwarded"))
        .await
        .unwrap();

    let logs = store.list_chat_logs(chat.chat_id).await.unwrap();
    let actions: Vec<&str> = logs.iter().map(|l| l.action.as_str()).collect();
    assert_eq!(actions, vec!["send_message", "completion_forwarded"]);
    assert_eq!(logs[0].details.as_deref(), Some("Message sent: hi..."));
    assert!(logs[1].details.is_none());
}

// ============================================================================
// cascading deletes
// ============================================================================

async fn count_rows(pool: &deadpool_postgres::Pool, table: &str, chat_id: Uuid) -> i64 {
    let client = pool.get().await.unwrap();
    let sql = format!("SELECT COUNT(*) FROM {} WHERE chat_id = $1", table);
    client.query_one(&sql, &[&chat_id]).await.unwrap().get(0)
}

#[tokio::test]
async fn test_deleting_chat_or_user_cascades() {
    setup_test!(_docker, _container, store, pool);

    let user = store
        .create_user(NewUser::new("ada", "ada@example.com"))
        .await
        .unwrap();
    let first = store.create_chat(NewChat { user_id: user.user_id }).await.unwrap();
    let second = store.create_chat(NewChat { user_id: user.user_id }).await.unwrap();

    for chat in [&first, &second] {
        store
            .create_message(NewMessage::inbound(chat.chat_id, user.user_id, "hi"))
            .await
            .unwrap();
        store
            .create_log(NewLog::new(user.user_id, chat.chat_id, "send_message"))
            .await
            .unwrap();
    }

    let client = pool.get().await.unwrap();

    client
        .execute("DELETE FROM chats WHERE chat_id = $1", &[&first.chat_id])
        .await
        .unwrap();
    assert_eq!(count_rows(&pool, "messages", first.chat_id).await, 0);
    assert_eq!(count_rows(&pool, "logs", first.chat_id).await, 0);
    assert_eq!(count_rows(&pool, "messages", second.chat_id).await, 1);
    assert_eq!(count_rows(&pool, "logs", second.chat_id).await, 1);

    client
        .execute("DELETE FROM users WHERE user_id = $1", &[&user.user_id])
        .await
        .unwrap();
    assert!(store.get_chat(second.chat_id).await.unwrap().is_none());
    assert_eq!(count_rows(&pool, "messages", second.chat_id).await, 0);
    assert_eq!(count_rows(&pool, "logs", second.chat_id).await, 0);
}
