use anyhow::Context;
use tracing::info;

use chat_relay::config::AppConfig;
use chat_relay::routes::configure_routes;
use chat_relay::state::AppState;
use chat_relay::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let state = AppState::from_config(&config).await?;

    let routes = configure_routes(state, &config.allowed_origins);

    info!("Starting server on http://{}", config.bind_addr);
    warp::serve(routes).run(config.bind_addr).await;

    Ok(())
}
