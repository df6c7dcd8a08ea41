// POST /api/v1/chat/message handler

use crate::models::SendMessageRequest;
use crate::relay::{RelayOutcome, RelayRequest};
use crate::state::AppState;

use super::ApiError;

/// Validate and relay one message
///
/// A completion failure is not an error here: the outcome carries
/// `partial_success` and the original content.
pub async fn send_message(
    state: &AppState,
    request: SendMessageRequest,
) -> Result<RelayOutcome, ApiError> {
    let request = RelayRequest::parse(&request.chat_id, &request.user_id, request.content)?;
    Ok(state.relay.send_message(request).await?)
}

pub async fn send_message_handler(
    request: SendMessageRequest,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let outcome = send_message(&state, request).await?;
    Ok(warp::reply::json(&outcome))
}
