mod ai;
mod app;
mod classifier;
mod config;
mod domain;
mod infrastructure;
mod normalizer;
mod web;

use anyhow::Result;
use infrastructure::logging;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config()?;
    logging::init_tracing(&config.logging)?;

    let app = app::DetectorApp::initialize(config)?;
    app.run().await
}
