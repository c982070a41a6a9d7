//! Preflight checks for the demo environment.
//!
//! Probes the three external tools and the API key resolution. Attached
//! devices are listed too, so a broken setup shows up here instead of
//! mid-run inside `mirror` or `up`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::adb::{AdbBridge, DeviceEntry};
use crate::config::Config;
use crate::credentials::{self, CredentialStore, KeySource};
use crate::docker::DemoContainer;
use crate::scrcpy;

/// Snapshot of everything `mirror` and `up` depend on.
#[derive(Debug, Serialize)]
pub struct DoctorReport {
    pub generated_at: DateTime<Utc>,
    pub adb: ToolStatus,
    pub scrcpy: ToolStatus,
    pub docker: ToolStatus,
    pub api_key: KeyStatus,
    pub devices: Vec<DeviceEntry>,
}

#[derive(Debug, Serialize)]
pub struct ToolStatus {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolStatus {
    fn from_probe<E: std::fmt::Display>(result: Result<String, E>) -> Self {
        match result {
            Ok(version) => Self {
                available: true,
                version: Some(version),
                error: None,
            },
            Err(e) => Self {
                available: false,
                version: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct KeyStatus {
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<KeySource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masked: Option<String>,
}

pub async fn run(config: &Config, json: bool) -> anyhow::Result<()> {
    let report = collect(config).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render(&report);
    }
    Ok(())
}

async fn collect(config: &Config) -> anyhow::Result<DoctorReport> {
    let adb = AdbBridge::from_config(config);
    let docker = DemoContainer::from_config(config);

    let (adb_probe, scrcpy_probe, docker_probe) =
        tokio::join!(adb.probe(), scrcpy::probe(config), docker.probe());

    let adb_status = ToolStatus::from_probe(adb_probe);
    let devices = if adb_status.available {
        match adb.devices().await {
            Ok(devices) => devices,
            Err(e) => {
                tracing::warn!("Failed to list devices: {e}");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    Ok(DoctorReport {
        generated_at: Utc::now(),
        adb: adb_status,
        scrcpy: ToolStatus::from_probe(scrcpy_probe),
        docker: ToolStatus::from_probe(docker_probe),
        api_key: key_status(config)?,
        devices,
    })
}

fn key_status(config: &Config) -> anyhow::Result<KeyStatus> {
    let resolved = match config.credentials_dir() {
        Ok(dir) => CredentialStore::new(dir).resolve_api_key()?,
        // No HOME: the file half of the resolution is unavailable, the
        // environment half still applies.
        Err(_) => std::env::var(credentials::API_KEY_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(|value| (value, KeySource::Environment)),
    };

    Ok(match resolved {
        Some((key, source)) => KeyStatus {
            configured: true,
            source: Some(source),
            masked: Some(credentials::mask(&key)),
        },
        None => KeyStatus {
            configured: false,
            source: None,
            masked: None,
        },
    })
}

fn render(report: &DoctorReport) {
    println!(
        "vivus doctor ({})",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();
    render_tool("adb", &report.adb);
    render_tool("scrcpy", &report.scrcpy);
    render_tool("docker", &report.docker);

    match (&report.api_key.source, &report.api_key.masked) {
        (Some(source), Some(masked)) => {
            let origin = match source {
                KeySource::File => "credential file",
                KeySource::Environment => "environment",
            };
            println!("{:<8} ok       {masked} ({origin})", "api key");
        }
        _ => println!(
            "{:<8} missing  run `vivus key set <value>` or export {}",
            "api key",
            credentials::API_KEY_ENV
        ),
    }

    println!();
    if report.devices.is_empty() {
        println!("No devices attached.");
    } else {
        println!("Devices:");
        for device in &report.devices {
            let model = device.model.as_deref().unwrap_or("-");
            println!("  {:<22} {:<14} {model}", device.serial, device.state);
        }
    }
}

fn render_tool(name: &str, status: &ToolStatus) {
    match (&status.version, &status.error) {
        (Some(version), _) => println!("{name:<8} ok       {version}"),
        (_, Some(error)) => println!("{name:<8} missing  {error}"),
        _ => println!("{name:<8} missing"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adb::DeviceState;

    #[test]
    fn reports_serialize_without_noise() {
        let report = DoctorReport {
            generated_at: Utc::now(),
            adb: ToolStatus {
                available: true,
                version: Some("Android Debug Bridge version 1.0.41".to_string()),
                error: None,
            },
            scrcpy: ToolStatus {
                available: false,
                version: None,
                error: Some("scrcpy not found at `scrcpy`".to_string()),
            },
            docker: ToolStatus {
                available: true,
                version: Some("server 27.0.3".to_string()),
                error: None,
            },
            api_key: KeyStatus {
                configured: true,
                source: Some(KeySource::File),
                masked: Some("****alue".to_string()),
            },
            devices: vec![DeviceEntry {
                serial: "R5CT20ABCDE".to_string(),
                state: DeviceState::Device,
                product: None,
                model: Some("SM_S911B".to_string()),
                device: None,
                transport_id: Some("1".to_string()),
            }],
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["adb"]["available"], true);
        // Absent optional fields stay out of the output entirely.
        assert!(json["adb"].get("error").is_none());
        assert!(json["scrcpy"].get("version").is_none());
        assert_eq!(json["api_key"]["source"], "file");
        assert_eq!(json["devices"][0]["state"], "device");
        assert!(json["devices"][0].get("product").is_none());
    }
}
