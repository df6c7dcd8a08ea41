use anyhow::Context;
use tracing::info;

use chat_relay::config::AppConfig;
use chat_relay::queue::{amqp, ConsumerConfig, QueueConsumer};
use chat_relay::state::AppState;
use chat_relay::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let state = AppState::from_config(&config).await?;

    let consumer_config = ConsumerConfig::new(config.queue_name.clone())
        .with_max_redeliveries(config.max_redeliveries);
    let consumer = QueueConsumer::new(state.relay, consumer_config);

    let (connection, channel) = amqp::connect(&config.amqp_url)
        .await
        .context("failed to connect to broker")?;
    info!(queue = %config.queue_name, "Connected to broker");

    amqp::run(&channel, &consumer).await?;

    connection.close(0, "worker shutting down").await?;
    info!("Worker stopped");
    Ok(())
}
