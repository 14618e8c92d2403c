//! deckrender service - main entry point

use anyhow::{Context, Result};
use deckrender::config::Config;
use deckrender::{logging, server};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    logging::init(&config).context("Failed to initialize logging")?;
    logging::log_config(&config);

    server::run_server(&config).await
}
