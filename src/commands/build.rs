//! Build the agent container image.

use crate::config::Config;
use crate::docker::DemoContainer;

pub async fn run(config: &Config) -> anyhow::Result<()> {
    let docker = DemoContainer::from_config(config);
    docker.build().await?;
    println!("\n✨ Image `{}` built.", docker.image());
    Ok(())
}
