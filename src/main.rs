pub mod api;
pub mod config;
pub mod db;
pub mod engine;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::Config;

const DEFAULT_LOG_FILTER: &str = "exercise_tracker=info,tower_http=info";

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Missing .env is the normal case outside development.
    let _ = dotenv::dotenv();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::parse();
    tracing::info!(store = ?config.store, "starting exercise tracker");

    api::server::start_server(config).await
}
