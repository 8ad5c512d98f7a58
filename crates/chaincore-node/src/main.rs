use anyhow::Result;
use chaincore_node::{config::NodeConfig, logging, wiring};
use chaincore_types::Role;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = NodeConfig::default();
    info!(channel = %config.channel.name, "starting chaincore node");

    let node = wiring::spawn(&config, Role::Leader).await?;

    tokio::select! {
        result = node.task => {
            result??;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            node.handle.stop()?;
        }
    }

    Ok(())
}
