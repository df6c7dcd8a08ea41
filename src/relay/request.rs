use serde::Serialize;
use uuid::Uuid;

use super::error::RelayError;

/// A validated inbound message
#[derive(Debug, Clone, PartialEq)]
pub struct RelayRequest {
    pub chat_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
}

impl RelayRequest {
    /// Validate raw identifiers and content
    ///
    /// Both ids must parse as UUIDs and the content must contain something
    /// other than whitespace.
    pub fn parse(chat_id: &str, user_id: &str, content: impl Into<String>) -> Result<Self, RelayError> {
        let chat_id = parse_uuid("chat_id", chat_id)?;
        let user_id = parse_uuid("user_id", user_id)?;
        let content = content.into();

        if content.trim().is_empty() {
            return Err(RelayError::InvalidInput("content must not be empty".to_string()));
        }

        Ok(Self {
            chat_id,
            user_id,
            content,
        })
    }
}

pub(crate) fn parse_uuid(field: &str, value: &str) -> Result<Uuid, RelayError> {
    Uuid::parse_str(value.trim())
        .map_err(|_| RelayError::InvalidInput(format!("{} is not a valid UUID: {:?}", field, value)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayStatus {
    Success,
    /// Completion failed; the original content is echoed back
    PartialSuccess,
}

/// Result of one relay cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelayOutcome {
    pub status: RelayStatus,
    /// Identifier of the persisted inbound message
    pub message_id: Uuid,
    pub chat_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    /// Identifier of the persisted reply, if one was generated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_id: Option<Uuid>,
}
