//! Configuration for the vivus launcher.
//!
//! Every knob is an environment variable; the defaults are the literal values
//! the demo was built around:
//! - `VIVUS_TUNNEL_HOST` - Optional. Host name resolved for the scrcpy tunnel. Defaults to `host.docker.internal`.
//! - `VIVUS_ADB_SERVER_PORT` - Optional. Port the host ADB server listens on. Defaults to `5037`.
//! - `VIVUS_IMAGE` - Optional. Image tag for the agent container. Defaults to `vivus`.
//! - `VIVUS_CONTAINER` - Optional. Name given to the running container. Defaults to `vivus`.
//! - `VIVUS_BUILD_CONTEXT` - Optional. Docker build context directory. Defaults to `.`.
//! - `VIVUS_CREDENTIALS_DIR` - Optional. Credential directory bind-mounted into
//!   the container. Defaults to `$HOME/.anthropic`.
//! - `ADB` / `SCRCPY` / `DOCKER` - Optional. Explicit paths to the external
//!   binaries, overriding discovery.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Launcher configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host name a container resolves to reach the host machine
    pub tunnel_host: String,

    /// Port the host ADB server listens on
    pub adb_server_port: u16,

    /// Image tag built and run for the agent container
    pub image: String,

    /// Name given to the running agent container
    pub container: String,

    /// Docker build context directory
    pub build_context: PathBuf,

    /// Credential directory bind-mounted into the container, when resolvable
    credentials_dir: Option<PathBuf>,

    /// Explicit adb binary override
    pub adb_program: Option<PathBuf>,

    /// Explicit scrcpy binary override
    pub scrcpy_program: Option<PathBuf>,

    /// Explicit docker binary override
    pub docker_program: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let tunnel_host = std::env::var("VIVUS_TUNNEL_HOST")
            .unwrap_or_else(|_| "host.docker.internal".to_string());

        let adb_server_port = std::env::var("VIVUS_ADB_SERVER_PORT")
            .unwrap_or_else(|_| "5037".to_string());
        let adb_server_port = parse_port("VIVUS_ADB_SERVER_PORT", &adb_server_port)?;

        let image = std::env::var("VIVUS_IMAGE").unwrap_or_else(|_| "vivus".to_string());

        let container = std::env::var("VIVUS_CONTAINER").unwrap_or_else(|_| "vivus".to_string());

        let build_context = std::env::var("VIVUS_BUILD_CONTEXT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let credentials_dir = std::env::var("VIVUS_CREDENTIALS_DIR")
            .map(PathBuf::from)
            .ok()
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".anthropic"))
            });

        Ok(Self {
            tunnel_host,
            adb_server_port,
            image,
            container,
            build_context,
            credentials_dir,
            adb_program: std::env::var("ADB").ok().map(PathBuf::from),
            scrcpy_program: std::env::var("SCRCPY").ok().map(PathBuf::from),
            docker_program: std::env::var("DOCKER").ok().map(PathBuf::from),
        })
    }

    /// Create a config carrying the demo's default values (useful for testing).
    pub fn new() -> Self {
        Self {
            tunnel_host: "host.docker.internal".to_string(),
            adb_server_port: 5037,
            image: "vivus".to_string(),
            container: "vivus".to_string(),
            build_context: PathBuf::from("."),
            credentials_dir: None,
            adb_program: None,
            scrcpy_program: None,
            docker_program: None,
        }
    }

    /// The credential directory bind-mounted into the agent container.
    ///
    /// Errors with `ConfigError::MissingEnvVar` when neither
    /// `VIVUS_CREDENTIALS_DIR` nor `HOME` was set.
    pub fn credentials_dir(&self) -> Result<&Path, ConfigError> {
        self.credentials_dir
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("HOME".to_string()))
    }

    /// Override the credential directory (useful for testing).
    pub fn with_credentials_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.credentials_dir = Some(dir.into());
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_port(var: &str, value: &str) -> Result<u16, ConfigError> {
    value
        .parse()
        .map_err(|e| ConfigError::InvalidValue(var.to_string(), format!("{e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo_literals() {
        let config = Config::new();
        assert_eq!(config.tunnel_host, "host.docker.internal");
        assert_eq!(config.adb_server_port, 5037);
        assert_eq!(config.image, "vivus");
        assert_eq!(config.container, "vivus");
        assert_eq!(config.build_context, PathBuf::from("."));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = parse_port("VIVUS_ADB_SERVER_PORT", "not-a-port").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue(var, _) if var == "VIVUS_ADB_SERVER_PORT"
        ));
    }

    #[test]
    fn missing_credentials_dir_is_a_typed_error() {
        let config = Config::new();
        assert!(matches!(
            config.credentials_dir(),
            Err(ConfigError::MissingEnvVar(var)) if var == "HOME"
        ));
    }

    #[test]
    fn credentials_dir_override_is_honored() {
        let config = Config::new().with_credentials_dir("/tmp/creds");
        assert_eq!(
            config.credentials_dir().unwrap(),
            Path::new("/tmp/creds")
        );
    }
}
