//! Core abstractions for the completion gateway

pub mod config;
pub mod error;
pub mod provider;
pub mod types;
