use anyhow::Context;
use edv_core::{AppError, Config};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    // Missing credentials are fatal before anything is served
    let config = Config::from_env()
        .map_err(AppError::from)
        .context("Invalid configuration")?;

    edv_api::telemetry::init_tracing(config.is_production());

    let router = edv_api::setup::initialize_app(&config)?;

    edv_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
