//! scrcpy session management.
//!
//! Builds the mirroring invocation: `--tunnel-host=<ip>` first, any
//! passthrough arguments after it, with `ADB_SERVER_SOCKET` set on the child
//! so the scrcpy-side adb client talks to the host server instead of
//! spawning its own.

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::{Child, Command};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum ScrcpyError {
    #[error("scrcpy not found at `{0}`. Install scrcpy or set SCRCPY to its location")]
    NotFound(String),

    #[error("Failed to run scrcpy: {0}")]
    Io(std::io::Error),

    #[error("`scrcpy {command}` exited with status {status}: {detail}")]
    Exit {
        command: String,
        status: i32,
        detail: String,
    },
}

/// A configured mirroring run.
#[derive(Debug, Clone)]
pub struct ScrcpySession {
    program: PathBuf,
    tunnel_host: Ipv4Addr,
    server_socket: String,
    extra_args: Vec<String>,
}

impl ScrcpySession {
    pub fn new(
        config: &Config,
        tunnel_host: Ipv4Addr,
        server_socket: String,
        extra_args: Vec<String>,
    ) -> Self {
        Self {
            program: resolve_program(config),
            tunnel_host,
            server_socket,
            extra_args,
        }
    }

    /// Argument vector: the tunnel host first, passthrough args after it.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![format!("--tunnel-host={}", self.tunnel_host)];
        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// The ready-to-spawn command, `ADB_SERVER_SOCKET` included.
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(self.args())
            .env("ADB_SERVER_SOCKET", &self.server_socket)
            .kill_on_drop(true);
        command
    }

    /// Spawn scrcpy. Output stays on the user's terminal.
    pub fn spawn(&self) -> Result<Child, ScrcpyError> {
        tracing::info!("Launching scrcpy --tunnel-host={}", self.tunnel_host);
        self.command()
            .spawn()
            .map_err(|e| map_spawn_err(&self.program, e))
    }
}

/// `scrcpy --version`, first line only. Used by `doctor`.
pub async fn probe(config: &Config) -> Result<String, ScrcpyError> {
    let program = resolve_program(config);
    let output = Command::new(&program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| map_spawn_err(&program, e))?;

    // Old scrcpy releases exit non-zero on --version; the banner still lands
    // on stdout, so trust the banner over the status.
    let stdout = String::from_utf8_lossy(&output.stdout);
    let first = stdout.lines().next().unwrap_or_default().trim().to_string();
    if first.is_empty() {
        return Err(ScrcpyError::Exit {
            command: "--version".to_string(),
            status: output.status.code().unwrap_or(-1),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(first)
}

fn resolve_program(config: &Config) -> PathBuf {
    config
        .scrcpy_program
        .clone()
        .unwrap_or_else(|| PathBuf::from("scrcpy"))
}

fn map_spawn_err(program: &Path, e: std::io::Error) -> ScrcpyError {
    if e.kind() == std::io::ErrorKind::NotFound {
        ScrcpyError::NotFound(program.display().to_string())
    } else {
        ScrcpyError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(extra: Vec<String>) -> ScrcpySession {
        ScrcpySession::new(
            &Config::new(),
            Ipv4Addr::new(192, 168, 65, 254),
            "tcp:host.docker.internal:5037".to_string(),
            extra,
        )
    }

    #[test]
    fn tunnel_host_flag_comes_first() {
        let args = session(vec![
            "--fullscreen".to_string(),
            "--max-fps".to_string(),
            "30".to_string(),
        ])
        .args();
        assert_eq!(args[0], "--tunnel-host=192.168.65.254");
        assert_eq!(&args[1..], ["--fullscreen", "--max-fps", "30"]);
    }

    #[test]
    fn bare_sessions_only_carry_the_tunnel_host() {
        assert_eq!(session(Vec::new()).args(), ["--tunnel-host=192.168.65.254"]);
    }

    #[test]
    fn child_env_carries_the_server_socket() {
        let command = session(Vec::new()).command();
        let envs: Vec<_> = command.as_std().get_envs().collect();
        assert!(envs.contains(&(
            std::ffi::OsStr::new("ADB_SERVER_SOCKET"),
            Some(std::ffi::OsStr::new("tcp:host.docker.internal:5037")),
        )));
    }

    #[tokio::test]
    async fn missing_binary_is_a_typed_error() {
        let mut config = Config::new();
        config.scrcpy_program = Some(PathBuf::from("/definitely/not/here/scrcpy"));
        let err = probe(&config).await.unwrap_err();
        assert!(matches!(err, ScrcpyError::NotFound(_)));
    }
}
