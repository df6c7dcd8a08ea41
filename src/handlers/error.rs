// Error responses and rejection recovery

use std::convert::Infallible;

use tracing::error;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

use crate::models::ErrorResponse;
use crate::relay::{GenerateError, RelayError};
use crate::store;

/// An error that renders as `{"detail": ...}` with a status code
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl warp::reject::Reject for ApiError {}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, detail)
    }
}

impl From<store::Error> for ApiError {
    fn from(err: store::Error) -> Self {
        match err {
            store::Error::ValidationError(msg) => ApiError::bad_request(msg),
            store::Error::ForeignKeyViolation(msg) => ApiError::not_found(msg),
            store::Error::UniqueViolation(msg) => ApiError::new(StatusCode::CONFLICT, msg),
            other => {
                error!(error = %other, "Persistence failure");
                ApiError::internal("Internal server error")
            }
        }
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::InvalidInput(msg) => ApiError::bad_request(msg),
            RelayError::Persistence(e) => e.into(),
        }
    }
}

impl From<GenerateError> for ApiError {
    fn from(err: GenerateError) -> Self {
        match err {
            GenerateError::InvalidInput(msg) => ApiError::unprocessable(msg),
            GenerateError::Delivery(e) => ApiError::bad_request(format!("Stream API error: {}", e)),
            GenerateError::Completion(e) => ApiError::internal(format!("Internal server error: {}", e)),
        }
    }
}

/// Render any rejection as a JSON error body
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let api_error = if err.is_not_found() {
        ApiError::not_found("Not Found")
    } else if let Some(e) = err.find::<ApiError>() {
        e.clone()
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        ApiError::unprocessable(e.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        ApiError::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, "Unsupported Media Type")
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large")
    } else {
        error!(rejection = ?err, "Unhandled rejection");
        ApiError::internal("Internal server error")
    };

    let body = warp::reply::json(&ErrorResponse {
        detail: api_error.detail,
    });
    Ok(warp::reply::with_status(body, api_error.status))
}
