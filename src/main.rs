use anyhow::Result;
use botdesk::{
    app::BotdeskApp,
    config,
    infrastructure::{directories, logging, shutdown},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config()?;
    let paths = directories::ensure_directories(&config.directories)?;
    logging::init_tracing(&config, &paths)?;

    let cancel = shutdown::install_signal_handlers();

    let app = BotdeskApp::initialize(config, paths, cancel).await?;
    app.run().await
}
