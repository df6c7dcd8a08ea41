// HTTP Server modules
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;

// Gateways to the database, the chat service and the language model
pub mod delivery;
pub mod llm;
pub mod store;

// Message relay and its queue-driven entry point
pub mod queue;
pub mod relay;

pub mod config;
pub mod telemetry;
