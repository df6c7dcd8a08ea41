//! AMQP transport
//!
//! Declares the durable queue, consumes with prefetch 1 and settles each
//! delivery with the disposition from [`QueueConsumer::handle`].

use futures::StreamExt;
use lapin::{
    message::Delivery,
    options::{
        BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicQosOptions,
        QueueDeclareOptions,
    },
    types::{AMQPValue, FieldTable, LongString, ShortString},
    Channel, Connection, ConnectionProperties,
};
use tracing::{info, warn};

use super::{
    consumer::{ConsumerConfig, Disposition, QueueConsumer},
    QueueError,
};

/// Header the broker stamps on quorum-queue redeliveries
const DELIVERY_COUNT_HEADER: &str = "x-delivery-count";

/// Connect and open a channel
pub async fn connect(url: &str) -> Result<(Connection, Channel), QueueError> {
    let connection = Connection::connect(url, ConnectionProperties::default()).await?;
    let channel = connection.create_channel().await?;
    Ok((connection, channel))
}

/// Declare the work queue, plus its dead-letter queue when redeliveries are capped
///
/// A capped queue is declared as a quorum queue so the broker tracks
/// `x-delivery-count`.
pub async fn declare_queues(channel: &Channel, config: &ConsumerConfig) -> Result<(), QueueError> {
    let durable = QueueDeclareOptions {
        durable: true,
        ..QueueDeclareOptions::default()
    };

    let mut arguments = FieldTable::default();
    if config.max_redeliveries.is_some() {
        let dead_letter = config.dead_letter_queue();
        channel
            .queue_declare(&dead_letter, durable, FieldTable::default())
            .await?;

        arguments.insert(
            ShortString::from("x-queue-type"),
            AMQPValue::LongString(LongString::from("quorum")),
        );
        arguments.insert(
            ShortString::from("x-dead-letter-exchange"),
            AMQPValue::LongString(LongString::from("")),
        );
        arguments.insert(
            ShortString::from("x-dead-letter-routing-key"),
            AMQPValue::LongString(LongString::from(dead_letter.as_str())),
        );
    }

    channel
        .queue_declare(&config.queue_name, durable, arguments)
        .await?;
    Ok(())
}

/// How many times the broker has already delivered this message
///
/// Prefers the quorum-queue header; on classic queues only the
/// `redelivered` flag is available.
pub fn prior_deliveries(delivery: &Delivery) -> u32 {
    let from_header = delivery.properties.headers().as_ref().and_then(|headers| {
        headers
            .inner()
            .iter()
            .find(|(key, _)| key.as_str() == DELIVERY_COUNT_HEADER)
            .and_then(|(_, value)| header_count(value))
    });

    from_header.unwrap_or(u32::from(delivery.redelivered))
}

fn header_count(value: &AMQPValue) -> Option<u32> {
    let count = match value {
        AMQPValue::ShortShortInt(v) => i64::from(*v),
        AMQPValue::ShortShortUInt(v) => i64::from(*v),
        AMQPValue::ShortInt(v) => i64::from(*v),
        AMQPValue::ShortUInt(v) => i64::from(*v),
        AMQPValue::LongInt(v) => i64::from(*v),
        AMQPValue::LongUInt(v) => i64::from(*v),
        AMQPValue::LongLongInt(v) => *v,
        _ => return None,
    };
    u32::try_from(count).ok()
}

/// Consume until the stream ends or the process receives Ctrl-C
pub async fn run(channel: &Channel, consumer: &QueueConsumer) -> Result<(), QueueError> {
    let config = consumer.config();

    declare_queues(channel, config).await?;
    channel
        .basic_qos(config.prefetch, BasicQosOptions::default())
        .await?;

    let mut deliveries = channel
        .basic_consume(
            &config.queue_name,
            &config.consumer_tag,
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await?;

    info!(queue = %config.queue_name, "Waiting for messages");

    loop {
        let next = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received, stopping consumer");
                break;
            }
            next = deliveries.next() => next,
        };

        let Some(delivery) = next else {
            warn!("Consumer stream closed by broker");
            break;
        };
        let delivery = delivery?;

        let disposition = consumer.handle(&delivery.data, prior_deliveries(&delivery)).await;
        settle(&delivery, disposition).await?;
    }

    Ok(())
}

async fn settle(delivery: &Delivery, disposition: Disposition) -> Result<(), QueueError> {
    match disposition {
        Disposition::Ack => delivery.ack(BasicAckOptions::default()).await?,
        Disposition::Requeue => {
            delivery
                .nack(BasicNackOptions {
                    requeue: true,
                    ..BasicNackOptions::default()
                })
                .await?
        }
        Disposition::DeadLetter => {
            delivery
                .nack(BasicNackOptions {
                    requeue: false,
                    ..BasicNackOptions::default()
                })
                .await?
        }
    }
    Ok(())
}
