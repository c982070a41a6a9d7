//! Follow the agent container's logs.

use crate::config::Config;
use crate::docker::DemoContainer;

pub async fn run(config: &Config) -> anyhow::Result<()> {
    let docker = DemoContainer::from_config(config);
    docker.logs(true).await?;
    Ok(())
}
