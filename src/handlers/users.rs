// User endpoints

use tracing::info;

use crate::models::{ChatSummary, CreateUserRequest, UserCreatedResponse, UserResponse};
use crate::state::AppState;
use crate::store::NewUser;

use super::{parse_id, ApiError};

/// POST /api/v1/users
pub async fn create_user(
    state: &AppState,
    request: CreateUserRequest,
) -> Result<UserCreatedResponse, ApiError> {
    let username = request.username.trim();
    let email = request.email.trim();
    if username.is_empty() || email.is_empty() {
        return Err(ApiError::unprocessable("username and email must not be empty"));
    }

    let user = state.store.create_user(NewUser::new(username, email)).await?;
    info!(user_id = %user.user_id, "Created user");

    Ok(UserCreatedResponse {
        user_id: user.user_id,
    })
}

/// GET /api/v1/users/{user_id}
pub async fn get_user(state: &AppState, user_id: &str) -> Result<UserResponse, ApiError> {
    let user_id = parse_id("user_id", user_id)?;

    state
        .store
        .get_user(user_id)
        .await?
        .map(UserResponse::from)
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// GET /api/v1/users/{user_id}/chats, newest first
pub async fn user_chats(state: &AppState, user_id: &str) -> Result<Vec<ChatSummary>, ApiError> {
    let user_id = parse_id("user_id", user_id)?;

    if state.store.get_user(user_id).await?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let chats = state.store.list_user_chats(user_id).await?;
    Ok(chats.into_iter().map(ChatSummary::from).collect())
}

pub async fn create_user_handler(
    request: CreateUserRequest,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let body = create_user(&state, request).await?;
    Ok(warp::reply::json(&body))
}

pub async fn get_user_handler(
    user_id: String,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let body = get_user(&state, &user_id).await?;
    Ok(warp::reply::json(&body))
}

pub async fn user_chats_handler(
    user_id: String,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let body = user_chats(&state, &user_id).await?;
    Ok(warp::reply::json(&body))
}
