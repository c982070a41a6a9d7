//! Command line interface definitions.

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "vivus")]
#[command(version)]
#[command(arg_required_else_help = true)]
#[command(about = "Launcher for the Vivus computer-use demo environment")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that adb, scrcpy, and docker are usable and list attached devices
    Doctor {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reset the ADB server and mirror the device screen through the tunnel host
    Mirror {
        /// Extra arguments passed through to scrcpy
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        scrcpy_args: Vec<String>,
    },

    /// Print shell exports for ADB_SERVER_SOCKET and REMOTE_DEVICE_HOST
    Env {},

    /// Build the agent container image
    Build {},

    /// Run the agent container and print its endpoints
    Up {
        /// Stay attached instead of detaching; the container is removed on exit
        #[arg(long)]
        attach: bool,
    },

    /// Stop and remove the agent container
    Down {},

    /// Follow the agent container's logs
    Logs {},

    /// Show or store the Anthropic API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum KeyAction {
    /// Show where the key comes from, masked
    Show {},

    /// Write the key to the credential directory
    Set {
        /// The API key value
        value: String,
    },
}
