use mediagate_api::{setup, telemetry};
use mediagate_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    telemetry::init_telemetry(config.log_json())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(environment = %config.environment(), "Configuration loaded and validated");

    let (state, router) = setup::initialize_app(config.clone()).await?;

    setup::server::start_server(&config, router, state.shutdown.clone()).await?;

    Ok(())
}
