use serde::{Deserialize, Serialize};

use super::QueueError;

fn default_user_message() -> bool {
    true
}

/// JSON body of a queued chat message
///
/// `sender_id` is accepted in place of `user_id` for older producers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuePayload {
    pub chat_id: String,
    #[serde(alias = "sender_id")]
    pub user_id: String,
    pub content: String,
    /// `false` marks a system message that is acknowledged without relaying
    #[serde(default = "default_user_message")]
    pub user_message: bool,
}

impl QueuePayload {
    pub fn decode(body: &[u8]) -> Result<Self, QueueError> {
        Ok(serde_json::from_slice(body)?)
    }
}
