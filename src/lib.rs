//! # vivus
//!
//! Launcher for the Vivus computer-use demo environment.
//!
//! This library provides:
//! - A host ADB server reset that puts the server on all interfaces
//! - scrcpy mirroring against the resolved tunnel host
//! - Build/run/inspect verbs for the agent container
//!
//! ## Architecture
//!
//! Every subcommand is a thin orchestration of external processes:
//! 1. `Config::from_env` reads the environment knobs
//! 2. One module per external tool (`adb`, `scrcpy`, `docker`) builds the
//!    argument vector and spawns the process
//! 3. Handlers in `commands` wire the tools together and report outcomes
//!
//! ## Example
//!
//! ```rust,ignore
//! use vivus::{adb::AdbBridge, config::Config};
//!
//! let config = Config::from_env()?;
//! let bridge = AdbBridge::from_config(&config);
//! assert_eq!(bridge.server_socket(), "tcp:host.docker.internal:5037");
//! ```

pub mod adb;
pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod docker;
pub mod scrcpy;
pub mod tunnel;

pub use config::Config;
