//! Anthropic provider implementation
//!
//! This module provides a client for the Anthropic Messages API using an
//! `x-api-key` credential.

pub mod client;
pub mod types;

// Re-export commonly used types
pub use client::AnthropicClient;
