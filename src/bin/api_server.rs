// HTTP API server binary for Global Voyager

use anyhow::Result;
use voyager::api::ApiServer;
use voyager::settings::ImportSettings;
use voyager::tracing::{init_tracing, DEFAULT_FILTER};
use voyager::util::env as env_util;

#[actix_web::main]
async fn main() -> Result<()> {
    // Load dotenv/env once (safe to call multiple times)
    env_util::init_env();
    init_tracing(DEFAULT_FILTER)?;

    tracing::info!("Initializing global-voyager API server");

    let server = ApiServer::from_env()?;
    let state = ImportSettings::from_env()?.app_state().await?;

    server.run(state).await?;

    Ok(())
}
