//! Stop and remove the agent container.

use crate::config::Config;
use crate::docker::DemoContainer;

pub async fn run(config: &Config) -> anyhow::Result<()> {
    let docker = DemoContainer::from_config(config);
    if docker.stop_and_remove().await? {
        println!("🛑 Container `{}` stopped and removed.", docker.name());
    } else {
        println!("Container `{}` was not running.", docker.name());
    }
    Ok(())
}
