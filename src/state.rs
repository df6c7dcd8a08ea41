//! Shared application state and service wiring

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

use crate::config::{AppConfig, DatabaseTarget};
use crate::delivery::{ChatDelivery, NoopDelivery, StreamChatClient};
use crate::llm::{create_provider, CompletionProvider};
use crate::relay::{MessageRelay, RelaySettings};
use crate::store::{MemoryStore, NewUser, PgStore, Store, StoreConfig};

/// Attempts made while waiting for the database at startup
pub const DB_CONNECT_ATTEMPTS: u32 = 5;

/// Pause between database connection attempts
pub const DB_CONNECT_INTERVAL: Duration = Duration::from_secs(5);

/// Everything a request handler needs, cloned into each route
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub relay: MessageRelay,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, relay: MessageRelay) -> Self {
        Self { store, relay }
    }

    /// Connect every gateway described by `config`
    ///
    /// Waits for the database, applies migrations and seeds the admin user
    /// when enabled.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let store = connect_store(config).await?;

        if config.seed_admin {
            seed_admin(store.as_ref()).await?;
        }

        let completion: Arc<dyn CompletionProvider> = Arc::from(
            create_provider(
                config.model.clone(),
                config.completion_api_key.clone(),
                config.completion_timeout,
            )
            .context("failed to build completion provider")?,
        );
        info!(model = %config.model, "Completion provider ready");

        let delivery = build_delivery(config)?;

        let settings = RelaySettings {
            assistant_id: config.assistant_id.clone(),
            persona: config.persona.clone(),
            generation: config.generation.clone(),
        };
        let relay = MessageRelay::new(store.clone(), delivery, completion, settings);

        Ok(Self::new(store, relay))
    }
}

async fn connect_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    match &config.database {
        DatabaseTarget::Memory => {
            warn!("Using in-memory store, data will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        DatabaseTarget::Postgres(url) => {
            let store_config = StoreConfig::from_connection_string(url)
                .context("invalid DATABASE_URL")?
                .with_max_pool_size(config.pool_size);

            let store = PgStore::connect_with_retry(store_config, DB_CONNECT_ATTEMPTS, DB_CONNECT_INTERVAL)
                .await
                .context("database unavailable")?;
            store.migrate().await.context("failed to apply migrations")?;

            Ok(Arc::new(store))
        }
    }
}

fn build_delivery(config: &AppConfig) -> anyhow::Result<Arc<dyn ChatDelivery>> {
    match &config.stream {
        Some(stream) => {
            let mut client = StreamChatClient::new(stream.api_key.clone(), &stream.secret)
                .context("failed to build chat delivery client")?;
            if let Some(location) = &stream.location {
                client = client.with_location(location);
            }
            info!("Chat delivery enabled");
            Ok(Arc::new(client))
        }
        None => {
            warn!("STREAM_API_KEY or STREAM_SECRET not set, chat delivery disabled");
            Ok(Arc::new(NoopDelivery))
        }
    }
}

/// Create the initial admin user when no users exist
pub async fn seed_admin(store: &dyn Store) -> anyhow::Result<()> {
    if store.count_users().await? > 0 {
        return Ok(());
    }

    let admin = store
        .create_user(NewUser::new("admin", "admin@example.com"))
        .await
        .context("failed to seed admin user")?;
    info!(user_id = %admin.user_id, "Seeded admin user");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_admin_only_once() {
        let store = MemoryStore::new();
        seed_admin(&store).await.unwrap();
        seed_admin(&store).await.unwrap();
        assert_eq!(store.count_users().await.unwrap(), 1);
    }
}
