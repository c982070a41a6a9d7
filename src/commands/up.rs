//! Run the agent container.

use anyhow::Context;

use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::docker::DemoContainer;

pub async fn run(config: &Config, attach: bool) -> anyhow::Result<()> {
    let credentials_dir = config.credentials_dir()?;
    let store = CredentialStore::new(credentials_dir);
    let (api_key, _) = store
        .resolve_api_key()?
        .context("No API key configured. Run `vivus key set <value>` or export ANTHROPIC_API_KEY")?;

    let docker = DemoContainer::from_config(config);
    docker.run(&api_key, credentials_dir, attach).await?;

    if !attach {
        println!("\n✨ Demo container `{}` is up.", docker.name());
        println!("🔗 VNC: vnc://localhost:5900");
        println!("🔗 Agent UI: http://localhost:8501");
        println!("🔗 noVNC: http://localhost:6080");
        println!("🔗 Combined interface: http://localhost:8080");
        println!("\nFollow logs with `vivus logs`; stop with `vivus down`.");
    }
    Ok(())
}
