//! OpenAI provider implementation
//!
//! Talks to the Chat Completions API with a bearer API key.

pub mod client;
pub mod types;

pub use client::OpenAiClient;
