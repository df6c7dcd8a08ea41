//! Completion gateway
//!
//! A narrow interface over hosted language models: one prompt in, generated
//! text out. OpenAI and Anthropic backends sit behind the same
//! [`CompletionProvider`] trait.

pub mod anthropic;
pub mod core;
pub mod openai;

// Re-export commonly used types
pub use core::{
    config::GenerationConfig,
    error::CompletionError,
    provider::{create_provider, CompletionProvider},
    types::{CompletionRequest, Model},
};
