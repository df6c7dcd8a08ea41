//! Stream Chat REST client
//!
//! Authenticates as the server with an HS256 JWT signed by the API secret.
//! Channels are of type `messaging` and keyed by chat id.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use super::{ChatDelivery, DeliveryError};

/// Global edge endpoint
pub const DEFAULT_BASE_URL: &str = "https://chat.stream-io-api.com";

const CHANNEL_TYPE: &str = "messaging";

#[derive(Serialize)]
struct ServerClaims {
    server: bool,
}

pub struct StreamChatClient {
    http_client: Client,
    api_key: String,
    /// Pre-signed server token, sent verbatim in `Authorization`
    token: String,
    base_url: String,
}

impl StreamChatClient {
    /// Create a client for the global edge
    ///
    /// # Errors
    ///
    /// Returns an error if the server token can't be signed or the HTTP
    /// client can't be built.
    pub fn new(api_key: impl Into<String>, secret: &str) -> Result<Self, DeliveryError> {
        let token = encode(
            &Header::default(),
            &ServerClaims { server: true },
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;

        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Use a regional proxy such as `dublin` or `singapore` (builder pattern)
    pub fn with_location(self, location: &str) -> Self {
        let url = format!("https://chat-proxy-{}.stream-io-api.com", location);
        self.with_base_url(url)
    }

    /// Point the client at a different host (builder pattern)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn channel_url(&self, chat_id: &str, action: &str) -> String {
        format!("{}/channels/{}/{}/{}", self.base_url, CHANNEL_TYPE, chat_id, action)
    }

    async fn post(&self, url: String, body: serde_json::Value) -> Result<(), DeliveryError> {
        let response = self
            .http_client
            .post(&url)
            .query(&[("api_key", &self.api_key)])
            .header("Authorization", &self.token)
            .header("stream-auth-type", "jwt")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        debug!(%url, "Chat service request succeeded");
        Ok(())
    }
}

#[async_trait]
impl ChatDelivery for StreamChatClient {
    async fn ensure_channel(&self, chat_id: &str, member_ids: &[String]) -> Result<(), DeliveryError> {
        let created_by = member_ids.first().cloned().unwrap_or_default();
        let body = json!({
            "data": {
                "members": member_ids,
                "created_by_id": created_by,
            },
            "state": false,
        });
        self.post(self.channel_url(chat_id, "query"), body).await
    }

    async fn publish(&self, chat_id: &str, text: &str, author_id: &str) -> Result<(), DeliveryError> {
        let body = json!({
            "message": {
                "text": text,
                "user_id": author_id,
            }
        });
        self.post(self.channel_url(chat_id, "message"), body).await
    }
}
