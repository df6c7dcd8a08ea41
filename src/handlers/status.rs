// GET / and GET /health

use tracing::error;

use crate::models::{HealthResponse, RootResponse};
use crate::state::AppState;

use super::ApiError;

pub fn root() -> RootResponse {
    RootResponse {
        message: "Chat relay API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
    }
}

/// Healthy when the database answers a ping
pub async fn health(state: &AppState) -> Result<HealthResponse, ApiError> {
    match state.store.ping().await {
        Ok(()) => Ok(HealthResponse {
            status: "healthy".to_string(),
        }),
        Err(e) => {
            error!(error = %e, "Health check failed");
            Err(ApiError::unavailable("Database unavailable"))
        }
    }
}

pub async fn root_handler() -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&root()))
}

pub async fn health_handler(state: AppState) -> Result<impl warp::Reply, warp::Rejection> {
    let body = health(&state).await?;
    Ok(warp::reply::json(&body))
}
