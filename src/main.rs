//! vivus - Launcher Entry Point
//!
//! Parses the CLI and dispatches to the subcommand handlers.

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vivus::cli::{Cli, Command, KeyAction};
use vivus::commands;
use vivus::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; stdout stays reserved for command output so that
    // `eval "$(vivus env)"` works.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vivus=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;
    debug!("Loaded configuration: tunnel host {}", config.tunnel_host);

    match cli.command {
        Command::Doctor { json } => commands::doctor::run(&config, json).await?,
        Command::Mirror { scrcpy_args } => commands::mirror::run(&config, scrcpy_args).await?,
        Command::Env {} => commands::env::run(&config).await?,
        Command::Build {} => commands::build::run(&config).await?,
        Command::Up { attach } => commands::up::run(&config, attach).await?,
        Command::Down {} => commands::down::run(&config).await?,
        Command::Logs {} => commands::logs::run(&config).await?,
        Command::Key { action } => match action {
            KeyAction::Show {} => commands::key::show(&config)?,
            KeyAction::Set { value } => commands::key::set(&config, &value)?,
        },
    }

    Ok(())
}
