// POST /generate-response handler

use crate::models::{GenerateRequest, GenerateResponse};
use crate::state::AppState;

use super::ApiError;

/// Generate a reply and post it to the chat channel, without persistence
pub async fn generate_response(
    state: &AppState,
    request: GenerateRequest,
) -> Result<GenerateResponse, ApiError> {
    let response = state
        .relay
        .generate_response(&request.user_id, &request.message, &request.chat_id)
        .await?;

    Ok(GenerateResponse { response })
}

pub async fn generate_response_handler(
    request: GenerateRequest,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let body = generate_response(&state, request).await?;
    Ok(warp::reply::json(&body))
}
