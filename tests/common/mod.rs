#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use testcontainers::{core::WaitFor, GenericImage, RunnableImage};
use uuid::Uuid;

use chat_relay::delivery::{ChatDelivery, DeliveryError};
use chat_relay::llm::{CompletionError, CompletionProvider, CompletionRequest};
use chat_relay::relay::{MessageRelay, RelaySettings};
use chat_relay::state::AppState;
use chat_relay::store::{
    self, Chat, ChatHistory, Log, MemoryStore, Message, NewChat, NewLog, NewMessage, NewUser,
    Store, User,
};

/// The PostgreSQL Docker image to use for testing
pub const POSTGRES_IMAGE: &str = "postgres";
pub const POSTGRES_TAG: &str = "16-alpine";

/// Default PostgreSQL port
pub const POSTGRES_PORT: u16 = 5432;

/// Default credentials for the test container
pub const POSTGRES_USER: &str = "postgres";
pub const POSTGRES_PASSWORD: &str = "chat_password";
pub const POSTGRES_DB: &str = "chat";

/// Create a runnable PostgreSQL container
pub fn create_postgres_container() -> RunnableImage<GenericImage> {
    let image = GenericImage::new(POSTGRES_IMAGE, POSTGRES_TAG)
        .with_env_var("POSTGRES_PASSWORD", POSTGRES_PASSWORD)
        .with_env_var("POSTGRES_DB", POSTGRES_DB)
        .with_wait_for(WaitFor::message_on_stderr("database system is ready to accept connections"));

    RunnableImage::from(image).with_tag(POSTGRES_TAG)
}

/// Build a connection string for the running container
pub fn build_connection_string(host: &str, port: u16) -> String {
    format!(
        "postgresql://{}:{}@{}:{}/{}",
        POSTGRES_USER, POSTGRES_PASSWORD, host, port, POSTGRES_DB
    )
}

// ============================================================================
// Fake gateways
// ============================================================================

/// One call made against [`RecordingDelivery`]
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryCall {
    EnsureChannel { chat_id: String, members: Vec<String> },
    Publish { chat_id: String, text: String, author_id: String },
}

/// Chat-delivery fake that records calls and the number of stored messages at each call
#[derive(Default)]
pub struct RecordingDelivery {
    calls: Mutex<Vec<DeliveryCall>>,
    messages_seen: Mutex<Vec<usize>>,
    store: Option<Arc<MemoryStore>>,
    fail: bool,
}

impl RecordingDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with a transport error
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn observing(mut self, store: Arc<MemoryStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn calls(&self) -> Vec<DeliveryCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn messages_seen(&self) -> Vec<usize> {
        self.messages_seen.lock().unwrap().clone()
    }

    fn record(&self, call: DeliveryCall) -> Result<(), DeliveryError> {
        if let Some(store) = &self.store {
            self.messages_seen
                .lock()
                .unwrap()
                .push(store.messages().unwrap().len());
        }
        self.calls.lock().unwrap().push(call);

        if self.fail {
            Err(DeliveryError::TransportError("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChatDelivery for RecordingDelivery {
    async fn ensure_channel(&self, chat_id: &str, member_ids: &[String]) -> Result<(), DeliveryError> {
        self.record(DeliveryCall::EnsureChannel {
            chat_id: chat_id.to_string(),
            members: member_ids.to_vec(),
        })
    }

    async fn publish(&self, chat_id: &str, text: &str, author_id: &str) -> Result<(), DeliveryError> {
        self.record(DeliveryCall::Publish {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
            author_id: author_id.to_string(),
        })
    }
}

/// Completion fake returning a fixed reply or a fixed failure
pub struct StubCompletion {
    reply: Option<String>,
    requests: Mutex<Vec<CompletionRequest>>,
    messages_seen: Mutex<Vec<usize>>,
    store: Option<Arc<MemoryStore>>,
}

impl StubCompletion {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            requests: Mutex::new(Vec::new()),
            messages_seen: Mutex::new(Vec::new()),
            store: None,
        }
    }

    /// Every call fails with a rate-limit error
    pub fn failing() -> Self {
        Self {
            reply: None,
            requests: Mutex::new(Vec::new()),
            messages_seen: Mutex::new(Vec::new()),
            store: None,
        }
    }

    pub fn observing(mut self, store: Arc<MemoryStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn messages_seen(&self) -> Vec<usize> {
        self.messages_seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for StubCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        if let Some(store) = &self.store {
            self.messages_seen
                .lock()
                .unwrap()
                .push(store.messages().unwrap().len());
        }
        self.requests.lock().unwrap().push(request);

        self.reply
            .clone()
            .ok_or(CompletionError::RateLimitExceeded { retry_after: None })
    }
}

/// Store whose database is unreachable
pub struct DownStore;

fn down<T>() -> store::Result<T> {
    Err(store::Error::ConnectionError("connection refused".to_string()))
}

#[async_trait]
impl Store for DownStore {
    async fn ping(&self) -> store::Result<()> {
        down()
    }
    async fn create_user(&self, _user: NewUser) -> store::Result<User> {
        down()
    }
    async fn get_user(&self, _user_id: Uuid) -> store::Result<Option<User>> {
        down()
    }
    async fn count_users(&self) -> store::Result<i64> {
        down()
    }
    async fn create_chat(&self, _chat: NewChat) -> store::Result<Chat> {
        down()
    }
    async fn get_chat(&self, _chat_id: Uuid) -> store::Result<Option<Chat>> {
        down()
    }
    async fn list_user_chats(&self, _user_id: Uuid) -> store::Result<Vec<Chat>> {
        down()
    }
    async fn get_chat_history(&self, _chat_id: Uuid) -> store::Result<Option<ChatHistory>> {
        down()
    }
    async fn create_message(&self, _message: NewMessage) -> store::Result<Message> {
        down()
    }
    async fn create_log(&self, _log: NewLog) -> store::Result<Log> {
        down()
    }
    async fn list_chat_logs(&self, _chat_id: Uuid) -> store::Result<Vec<Log>> {
        down()
    }
}

// ============================================================================
// Wiring helpers
// ============================================================================

/// The gateways behind one relay, kept so tests can inspect them
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub delivery: Arc<RecordingDelivery>,
    pub completion: Arc<StubCompletion>,
    pub relay: MessageRelay,
}

impl Harness {
    /// Relay over a fresh in-memory store
    pub fn new(delivery: RecordingDelivery, completion: StubCompletion) -> Self {
        Self::with_settings(delivery, completion, RelaySettings::default())
    }

    pub fn with_settings(
        delivery: RecordingDelivery,
        completion: StubCompletion,
        settings: RelaySettings,
    ) -> Self {
        let store = Arc::new(MemoryStore::new());
        let delivery = Arc::new(delivery.observing(store.clone()));
        let completion = Arc::new(completion.observing(store.clone()));
        let relay = MessageRelay::new(store.clone(), delivery.clone(), completion.clone(), settings);

        Self {
            store,
            delivery,
            completion,
            relay,
        }
    }

    /// Replying "hello back" with a working delivery channel
    pub fn replying() -> Self {
        Self::new(RecordingDelivery::new(), StubCompletion::replying("hello back"))
    }

    pub fn state(&self) -> AppState {
        AppState::new(self.store.clone(), self.relay.clone())
    }

    /// A user with one chat
    pub async fn seed_chat(&self) -> (User, Chat) {
        let user = self
            .store
            .create_user(NewUser::new("ada", "ada@example.com"))
            .await
            .unwrap();
        let chat = self
            .store
            .create_chat(NewChat { user_id: user.user_id })
            .await
            .unwrap();
        (user, chat)
    }
}
