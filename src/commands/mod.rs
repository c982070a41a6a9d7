//! Subcommand handlers.
//!
//! Each module is a thin orchestration of the tool wrappers. User-facing
//! output goes to stdout; diagnostics go through `tracing` on stderr.

pub mod build;
pub mod doctor;
pub mod down;
pub mod env;
pub mod key;
pub mod logs;
pub mod mirror;
pub mod up;
