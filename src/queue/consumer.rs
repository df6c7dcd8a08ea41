use tracing::{debug, error, info, warn};

use crate::relay::{MessageRelay, RelayRequest};

use super::payload::QueuePayload;

/// How a delivery is settled with the broker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Ack,
    /// Negative acknowledge with requeue
    Requeue,
    /// Negative acknowledge without requeue, routed to the dead-letter queue
    DeadLetter,
}

#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub queue_name: String,
    pub consumer_tag: String,
    pub prefetch: u16,
    /// Deliveries allowed before a failing message is dead-lettered; `None` requeues forever
    pub max_redeliveries: Option<u32>,
}

impl ConsumerConfig {
    pub fn new(queue_name: impl Into<String>) -> Self {
        Self {
            queue_name: queue_name.into(),
            consumer_tag: "chat-relay-worker".to_string(),
            prefetch: 1,
            max_redeliveries: None,
        }
    }

    /// Set the consumer tag (builder pattern)
    pub fn with_consumer_tag(mut self, tag: impl Into<String>) -> Self {
        self.consumer_tag = tag.into();
        self
    }

    /// Cap redeliveries (builder pattern)
    pub fn with_max_redeliveries(mut self, max: Option<u32>) -> Self {
        self.max_redeliveries = max;
        self
    }

    /// Name of the queue that receives dead-lettered messages
    pub fn dead_letter_queue(&self) -> String {
        format!("{}.dead", self.queue_name)
    }
}

pub struct QueueConsumer {
    relay: MessageRelay,
    config: ConsumerConfig,
}

impl QueueConsumer {
    pub fn new(relay: MessageRelay, config: ConsumerConfig) -> Self {
        Self { relay, config }
    }

    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    /// Process one delivery body
    ///
    /// `prior_deliveries` is how many times the broker has already handed
    /// this message out. Decode, validation and persistence failures are
    /// requeued until the configured cap is reached.
    pub async fn handle(&self, body: &[u8], prior_deliveries: u32) -> Disposition {
        let payload = match QueuePayload::decode(body) {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "Failed to decode queue payload");
                return self.failed(prior_deliveries);
            }
        };

        if !payload.user_message {
            debug!(chat_id = %payload.chat_id, "System message received, nothing to relay");
            return Disposition::Ack;
        }

        let request = match RelayRequest::parse(&payload.chat_id, &payload.user_id, payload.content) {
            Ok(request) => request,
            Err(e) => {
                error!(chat_id = %payload.chat_id, error = %e, "Rejected queue payload");
                return self.failed(prior_deliveries);
            }
        };

        match self.relay.send_message(request).await {
            Ok(outcome) => {
                info!(
                    chat_id = %outcome.chat_id,
                    message_id = %outcome.message_id,
                    status = ?outcome.status,
                    "Relayed queued message"
                );
                Disposition::Ack
            }
            Err(e) => {
                error!(error = %e, "Failed to relay queued message");
                self.failed(prior_deliveries)
            }
        }
    }

    fn failed(&self, prior_deliveries: u32) -> Disposition {
        match self.config.max_redeliveries {
            Some(max) if prior_deliveries >= max => {
                warn!(prior_deliveries, max, "Redelivery limit reached, dead-lettering message");
                Disposition::DeadLetter
            }
            _ => Disposition::Requeue,
        }
    }
}
