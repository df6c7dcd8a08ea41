use thiserror::Error;

use crate::delivery::DeliveryError;
use crate::llm::CompletionError;
use crate::store;

/// Failures that abort a relay before any downstream call
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to persist message: {0}")]
    Persistence(#[from] store::Error),
}

/// Failures of the persistence-free `/generate-response` flow
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Completion failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("Chat delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}
