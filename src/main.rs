use anyhow::Result;
use wp_bridge::{BridgeConfig, BridgeServer, WordPressHandler};

#[tokio::main]
async fn main() -> Result<()> {
    let config = BridgeConfig::load()?;
    wp_bridge::logging::init(config.server.log_level.as_deref().unwrap_or("info"));

    let handler = WordPressHandler::new(config.wordpress);
    let server = BridgeServer::new(handler);

    server.run_stdio().await?;

    Ok(())
}
