// Handlers module
//
// Each endpoint has a typed function returning `Result<T, ApiError>` and a
// thin warp handler that renders it as JSON.

pub mod chats;
pub mod error;
pub mod generate_response;
pub mod send_message;
pub mod status;
pub mod users;

use uuid::Uuid;

pub use chats::{chat_history_handler, chat_logs_handler, create_chat_handler};
pub use error::{handle_rejection, ApiError};
pub use generate_response::generate_response_handler;
pub use send_message::send_message_handler;
pub use status::{health_handler, root_handler};
pub use users::{create_user_handler, get_user_handler, user_chats_handler};

/// Parse an identifier from a path or body, mapping failures to 400
pub(crate) fn parse_id(field: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::bad_request(format!("Invalid {} format", field)))
}
