//! Error types for the completion gateway

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when requesting a completion
///
/// The relay treats every variant the same way; the distinctions exist for
/// logging.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Missing or rejected credentials
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Non-success HTTP status or transport failure (status 0)
    #[error("HTTP error (status {status}): {body}")]
    HttpError { status: u16, body: String },

    /// Request or response timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// JSON encoding/decoding issues
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded (retry after {retry_after:?})")]
    RateLimitExceeded { retry_after: Option<Duration> },

    /// Provider-reported error payload
    #[error("Provider error ({code}): {message}")]
    ProviderError { code: String, message: String },

    /// The provider answered but produced no text
    #[error("Provider returned an empty completion")]
    EmptyResponse,
}

impl CompletionError {
    /// Classify a non-success HTTP response
    ///
    /// `code` is the provider's error type when the body carried one.
    pub(crate) fn from_status(
        status: u16,
        retry_after: Option<Duration>,
        code: Option<String>,
        body: String,
    ) -> Self {
        match (status, code) {
            (401 | 403, _) => CompletionError::AuthenticationError(body),
            (429, _) => CompletionError::RateLimitExceeded { retry_after },
            (_, Some(code)) => CompletionError::ProviderError { code, message: body },
            (_, None) => CompletionError::HttpError { status, body },
        }
    }
}

impl From<serde_json::Error> for CompletionError {
    fn from(err: serde_json::Error) -> Self {
        CompletionError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return CompletionError::Timeout(err.to_string());
        }
        if err.is_decode() {
            return CompletionError::SerializationError(err.to_string());
        }

        CompletionError::HttpError {
            status: err.status().map(|s| s.as_u16()).unwrap_or(0),
            body: err.to_string(),
        }
    }
}

/// Parse a `retry-after` header given in whole seconds
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
