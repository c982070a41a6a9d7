//! Android Debug Bridge wrapper.
//!
//! Owns every `adb` invocation the launcher makes: the server reset that puts
//! the host ADB server on all interfaces, device enumeration for preflight
//! checks, and the `tcp:<host>:<port>` socket literal handed to scrcpy.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::Serialize;
use thiserror::Error;
use tokio::process::{Child, Command};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum AdbError {
    #[error("adb not found at `{0}`. Set ADB or ANDROID_SDK_ROOT, or install platform-tools")]
    NotFound(String),

    #[error("Failed to run adb: {0}")]
    Io(std::io::Error),

    #[error("`adb {command}` exited with status {status}: {detail}")]
    Exit {
        command: String,
        status: i32,
        detail: String,
    },
}

/// Connection state reported by `adb devices`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    Device,
    Offline,
    Unauthorized,
    Recovery,
    Sideload,
    Bootloader,
    Unknown,
}

impl DeviceState {
    fn parse(raw: &str) -> Self {
        match raw {
            "device" => Self::Device,
            "offline" => Self::Offline,
            "unauthorized" => Self::Unauthorized,
            "recovery" => Self::Recovery,
            "sideload" => Self::Sideload,
            "bootloader" => Self::Bootloader,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::Offline => "offline",
            Self::Unauthorized => "unauthorized",
            Self::Recovery => "recovery",
            Self::Sideload => "sideload",
            Self::Bootloader => "bootloader",
            Self::Unknown => "unknown",
        }
    }

    /// Only `device` means the daemon is reachable and authorized.
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Device)
    }
}

impl std::fmt::Display for DeviceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// One line of `adb devices -l`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceEntry {
    pub serial: String,
    pub state: DeviceState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_id: Option<String>,
}

/// Client for the host `adb` binary and its server endpoint.
#[derive(Debug, Clone)]
pub struct AdbBridge {
    program: PathBuf,
    server_host: String,
    server_port: u16,
}

impl AdbBridge {
    pub fn from_config(config: &Config) -> Self {
        Self {
            program: resolve_program(config),
            server_host: config.tunnel_host.clone(),
            server_port: config.adb_server_port,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The `ADB_SERVER_SOCKET` value handed to scrcpy. With default
    /// configuration this is exactly `tcp:host.docker.internal:5037`.
    pub fn server_socket(&self) -> String {
        format!("tcp:{}:{}", self.server_host, self.server_port)
    }

    /// `adb kill-server`. Killing a server that is not running still counts
    /// as success; the reset has to be idempotent.
    pub async fn kill_server(&self) -> Result<(), AdbError> {
        let output = self.output(&["kill-server"]).await?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("server not running") || stderr.contains("cannot connect to daemon") {
            return Ok(());
        }
        Err(exit_error("kill-server", &output))
    }

    /// Spawn `adb -a nodaemon server start` with its output discarded.
    ///
    /// The returned child is the only handle on the server; callers stop it
    /// through [`kill_server`](Self::kill_server) and reap or kill the child.
    pub fn start_server(&self) -> Result<Child, AdbError> {
        tracing::debug!(
            "Starting ADB server: {} -a nodaemon server start",
            self.program.display()
        );
        Command::new(&self.program)
            .args(["-a", "nodaemon", "server", "start"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.map_spawn_err(e))
    }

    /// `adb devices -l`, parsed.
    pub async fn devices(&self) -> Result<Vec<DeviceEntry>, AdbError> {
        let output = self.output(&["devices", "-l"]).await?;
        if !output.status.success() {
            return Err(exit_error("devices -l", &output));
        }
        Ok(parse_devices(&String::from_utf8_lossy(&output.stdout)))
    }

    /// `adb version`, first line only. Used by `doctor`.
    pub async fn probe(&self) -> Result<String, AdbError> {
        let output = self.output(&["version"]).await?;
        if !output.status.success() {
            return Err(exit_error("version", &output));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
    }

    async fn output(&self, args: &[&str]) -> Result<std::process::Output, AdbError> {
        Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.map_spawn_err(e))
    }

    fn map_spawn_err(&self, e: std::io::Error) -> AdbError {
        if e.kind() == std::io::ErrorKind::NotFound {
            AdbError::NotFound(self.program.display().to_string())
        } else {
            AdbError::Io(e)
        }
    }
}

fn exit_error(command: &str, output: &std::process::Output) -> AdbError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let detail = if stderr.trim().is_empty() {
        stdout.trim()
    } else {
        stderr.trim()
    };
    AdbError::Exit {
        command: command.to_string(),
        status: output.status.code().unwrap_or(-1),
        detail: detail.to_string(),
    }
}

/// Locate the adb binary: explicit override first, then the Android SDK
/// layout, then whatever `PATH` has.
fn resolve_program(config: &Config) -> PathBuf {
    if let Some(path) = &config.adb_program {
        return path.clone();
    }
    if let Ok(sdk_root) =
        std::env::var("ANDROID_SDK_ROOT").or_else(|_| std::env::var("ANDROID_HOME"))
    {
        let candidate = PathBuf::from(&sdk_root).join("platform-tools").join("adb");
        if candidate.exists() {
            return candidate;
        }
    }
    PathBuf::from("adb")
}

/// Parse `adb devices -l` output.
///
/// Tolerates the banner line, daemon startup notices (`* daemon ...`), blank
/// lines, and unknown trailing fields.
fn parse_devices(output: &str) -> Vec<DeviceEntry> {
    let mut entries = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('*') || line.starts_with("List of devices") {
            continue;
        }

        let mut parts = line.split_whitespace();
        let serial = match parts.next() {
            Some(serial) => serial,
            None => continue,
        };
        let state = match parts.next() {
            Some(state) => DeviceState::parse(state),
            None => continue,
        };

        let mut entry = DeviceEntry {
            serial: serial.to_string(),
            state,
            product: None,
            model: None,
            device: None,
            transport_id: None,
        };

        for part in parts {
            if let Some((key, value)) = part.split_once(':') {
                match key {
                    "product" => entry.product = Some(value.to_string()),
                    "model" => entry.model = Some(value.to_string()),
                    "device" => entry.device = Some(value.to_string()),
                    "transport_id" => entry.transport_id = Some(value.to_string()),
                    _ => {}
                }
            }
        }

        entries.push(entry);
    }

    entries
}
