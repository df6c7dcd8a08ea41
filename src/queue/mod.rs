//! Queue consumer
//!
//! Pulls serialized chat messages off a durable AMQP queue one at a time and
//! runs them through the [`MessageRelay`](crate::relay::MessageRelay).
//! [`QueueConsumer::handle`] decides how each delivery is settled; the
//! [`amqp`] module owns the broker connection.

pub mod amqp;
pub mod consumer;
pub mod payload;

use thiserror::Error;

pub use consumer::{ConsumerConfig, Disposition, QueueConsumer};
pub use payload::QueuePayload;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Malformed queue payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Broker error: {0}")]
    Transport(#[from] lapin::Error),
}
