// Chat endpoints

use tracing::{error, info};

use crate::models::{ChatCreatedResponse, CreateChatRequest, HistoryEntry, LogEntry};
use crate::state::AppState;
use crate::store::{self, NewChat};

use super::{parse_id, ApiError};

/// POST /api/v1/chats
pub async fn create_chat(
    state: &AppState,
    request: CreateChatRequest,
) -> Result<ChatCreatedResponse, ApiError> {
    let user_id = parse_id("user_id", &request.user_id)?;

    let chat = state
        .store
        .create_chat(NewChat { user_id })
        .await
        .map_err(|e| match e {
            store::Error::ForeignKeyViolation(msg) => {
                error!(%user_id, error = %msg, "Chat owner does not exist");
                ApiError::internal("Could not create chat")
            }
            other => other.into(),
        })?;
    info!(chat_id = %chat.chat_id, %user_id, "Created chat");

    Ok(ChatCreatedResponse {
        chat_id: chat.chat_id,
    })
}

/// GET /api/v1/chats/{chat_id}
pub async fn chat_history(state: &AppState, chat_id: &str) -> Result<Vec<HistoryEntry>, ApiError> {
    let chat_id = parse_id("chat_id", chat_id)?;

    let history = state
        .store
        .get_chat_history(chat_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Chat not found"))?;

    Ok(history.messages.into_iter().map(HistoryEntry::from).collect())
}

/// GET /api/v1/chats/{chat_id}/logs
pub async fn chat_logs(state: &AppState, chat_id: &str) -> Result<Vec<LogEntry>, ApiError> {
    let chat_id = parse_id("chat_id", chat_id)?;

    if state.store.get_chat(chat_id).await?.is_none() {
        return Err(ApiError::not_found("Chat not found"));
    }

    let logs = state.store.list_chat_logs(chat_id).await?;
    Ok(logs.into_iter().map(LogEntry::from).collect())
}

pub async fn create_chat_handler(
    request: CreateChatRequest,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let body = create_chat(&state, request).await?;
    Ok(warp::reply::json(&body))
}

pub async fn chat_history_handler(
    chat_id: String,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let body = chat_history(&state, &chat_id).await?;
    Ok(warp::reply::json(&body))
}

pub async fn chat_logs_handler(
    chat_id: String,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let body = chat_logs(&state, &chat_id).await?;
    Ok(warp::reply::json(&body))
}
