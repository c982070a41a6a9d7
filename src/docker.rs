//! Agent container lifecycle.
//!
//! Wraps the `docker` CLI for the demo image: build, run with the demo's
//! exact flag surface (privileged, USB bus bind-mount, API key injection,
//! credential bind-mount, the four fixed port mappings), stop/remove, and
//! log following.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;

use crate::config::Config;
use crate::credentials::API_KEY_ENV;

/// Ports the agent image listens on. Fixed because the image hard-codes them:
/// VNC, the agent web UI, noVNC, and the combined interface.
pub const DEMO_PORTS: [u16; 4] = [5900, 8501, 6080, 8080];

/// Where the credential directory lands inside the container.
pub const CONTAINER_CREDENTIALS_DIR: &str = "/home/computeruse/.anthropic";

#[derive(Debug, Error)]
pub enum DockerError {
    #[error("docker not found at `{0}`. Is Docker installed and in your PATH?")]
    NotFound(String),

    #[error("Failed to run docker: {0}")]
    Io(std::io::Error),

    #[error("`docker {command}` exited with status {status}")]
    CommandFailed { command: String, status: i32 },

    #[error("`docker {command}` failed with status {status}: {detail}")]
    Exit {
        command: String,
        status: i32,
        detail: String,
    },
}

/// The demo container and the image it runs.
#[derive(Debug, Clone)]
pub struct DemoContainer {
    program: PathBuf,
    image: String,
    name: String,
    build_context: PathBuf,
}

impl DemoContainer {
    pub fn from_config(config: &Config) -> Self {
        Self {
            program: config
                .docker_program
                .clone()
                .unwrap_or_else(|| PathBuf::from("docker")),
            image: config.image.clone(),
            name: config.container.clone(),
            build_context: config.build_context.clone(),
        }
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Argument vector for `docker build`: `build -t <image> <context>`.
    pub fn build_args(&self) -> Vec<String> {
        vec![
            "build".to_string(),
            "-t".to_string(),
            self.image.clone(),
            self.build_context.display().to_string(),
        ]
    }

    /// `docker build`, streaming build output to the terminal.
    pub async fn build(&self) -> Result<(), DockerError> {
        tracing::info!(
            "Building image {} from {}",
            self.image,
            self.build_context.display()
        );
        self.stream(&self.build_args()).await
    }

    /// Argument vector for `docker run`, carrying the demo's flag surface.
    ///
    /// Attached runs are interactive and remove themselves on exit; detached
    /// runs stay behind for `logs` and `down`. The vector contains the API
    /// key, so callers must never log it.
    pub fn run_args(&self, api_key: &str, credentials_dir: &Path, attach: bool) -> Vec<String> {
        let mut args = vec!["run".to_string()];
        if attach {
            args.extend(["-it".to_string(), "--rm".to_string()]);
        } else {
            args.push("-d".to_string());
        }
        args.extend(["--name".to_string(), self.name.clone()]);
        args.push("--privileged".to_string());
        args.extend(["-v".to_string(), "/dev/bus/usb:/dev/bus/usb".to_string()]);
        args.extend(["-e".to_string(), format!("{API_KEY_ENV}={api_key}")]);
        args.extend([
            "-v".to_string(),
            format!(
                "{}:{}",
                credentials_dir.display(),
                CONTAINER_CREDENTIALS_DIR
            ),
        ]);
        for port in DEMO_PORTS {
            args.extend(["-p".to_string(), format!("{port}:{port}")]);
        }
        args.push(self.image.clone());
        args
    }

    /// Run the agent container with inherited stdio.
    pub async fn run(
        &self,
        api_key: &str,
        credentials_dir: &Path,
        attach: bool,
    ) -> Result<(), DockerError> {
        tracing::info!("Starting container {} from image {}", self.name, self.image);
        self.stream(&self.run_args(api_key, credentials_dir, attach))
            .await
    }

    /// `docker stop` then `docker rm`. A container that does not exist is
    /// fine; `down` has to be idempotent. Returns whether anything existed.
    pub async fn stop_and_remove(&self) -> Result<bool, DockerError> {
        let stopped = self.tolerant(&["stop", &self.name]).await?;
        let removed = self.tolerant(&["rm", &self.name]).await?;
        Ok(stopped || removed)
    }

    /// `docker logs` with inherited stdio.
    pub async fn logs(&self, follow: bool) -> Result<(), DockerError> {
        let mut args = vec!["logs".to_string()];
        if follow {
            args.push("-f".to_string());
        }
        args.push(self.name.clone());
        self.stream(&args).await
    }

    /// Daemon version for `doctor`, falling back to the client banner when
    /// the daemon is unreachable.
    pub async fn probe(&self) -> Result<String, DockerError> {
        let output = self
            .output(&["version", "--format", "{{.Server.Version}}"])
            .await?;
        if output.status.success() {
            let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !version.is_empty() {
                return Ok(format!("server {version}"));
            }
        }

        let output = self.output(&["--version"]).await?;
        if !output.status.success() {
            return Err(exit_error("--version", &output));
        }
        let client = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        Ok(format!("{client} (daemon unreachable)"))
    }

    /// Run a docker command with the user's terminal attached.
    async fn stream(&self, args: &[String]) -> Result<(), DockerError> {
        let status = Command::new(&self.program)
            .args(args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| self.map_spawn_err(e))?;
        if !status.success() {
            return Err(DockerError::CommandFailed {
                command: args.first().cloned().unwrap_or_default(),
                status: status.code().unwrap_or(-1),
            });
        }
        Ok(())
    }

    /// Run a docker command, treating "No such container" as a clean miss.
    async fn tolerant(&self, args: &[&str]) -> Result<bool, DockerError> {
        let output = self.output(args).await?;
        if output.status.success() {
            return Ok(true);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("No such container") {
            return Ok(false);
        }
        Err(exit_error(&args.join(" "), &output))
    }

    async fn output(&self, args: &[&str]) -> Result<std::process::Output, DockerError> {
        Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.map_spawn_err(e))
    }

    fn map_spawn_err(&self, e: std::io::Error) -> DockerError {
        if e.kind() == std::io::ErrorKind::NotFound {
            DockerError::NotFound(self.program.display().to_string())
        } else {
            DockerError::Io(e)
        }
    }
}

fn exit_error(command: &str, output: &std::process::Output) -> DockerError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let detail = if stderr.trim().is_empty() {
        stdout.trim()
    } else {
        stderr.trim()
    };
    DockerError::Exit {
        command: command.to_string(),
        status: output.status.code().unwrap_or(-1),
        detail: detail.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> DemoContainer {
        DemoContainer::from_config(&Config::new())
    }

    fn has_pair(args: &[String], first: &str, second: &str) -> bool {
        args.windows(2).any(|w| w[0] == first && w[1] == second)
    }

    #[test]
    fn build_targets_the_configured_image_and_context() {
        assert_eq!(demo().build_args(), ["build", "-t", "vivus", "."]);
    }

    #[test]
    fn run_args_carry_the_demo_flag_surface_in_order() {
        let args = demo().run_args("sk-ant-test", Path::new("/home/demo/.anthropic"), false);
        assert_eq!(
            args,
            [
                "run",
                "-d",
                "--name",
                "vivus",
                "--privileged",
                "-v",
                "/dev/bus/usb:/dev/bus/usb",
                "-e",
                "ANTHROPIC_API_KEY=sk-ant-test",
                "-v",
                "/home/demo/.anthropic:/home/computeruse/.anthropic",
                "-p",
                "5900:5900",
                "-p",
                "8501:8501",
                "-p",
                "6080:6080",
                "-p",
                "8080:8080",
                "vivus",
            ]
        );
    }

    #[test]
    fn detached_runs_are_named_and_daemonized() {
        let args = demo().run_args("key", Path::new("/tmp/creds"), false);
        assert!(args.contains(&"-d".to_string()));
        assert!(has_pair(&args, "--name", "vivus"));
        assert!(!args.contains(&"--rm".to_string()));
        assert!(!args.contains(&"-it".to_string()));
    }

    #[test]
    fn attached_runs_clean_up_after_themselves() {
        let args = demo().run_args("key", Path::new("/tmp/creds"), true);
        assert!(args.contains(&"-it".to_string()));
        assert!(args.contains(&"--rm".to_string()));
        assert!(!args.contains(&"-d".to_string()));
    }

    #[tokio::test]
    async fn missing_binary_is_a_typed_error() {
        let mut config = Config::new();
        config.docker_program = Some(PathBuf::from("/definitely/not/here/docker"));
        let docker = DemoContainer::from_config(&config);
        let err = docker.probe().await.unwrap_err();
        assert!(matches!(err, DockerError::NotFound(_)));
    }
}
