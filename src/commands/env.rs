//! Print the demo's environment exports.

use crate::adb::AdbBridge;
use crate::config::Config;
use crate::tunnel;

/// Emit `export` lines suitable for `eval "$(vivus env)"`.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    let adb = AdbBridge::from_config(config);
    let remote = tunnel::resolve_ipv4(&config.tunnel_host).await?;

    println!("export ADB_SERVER_SOCKET={}", adb.server_socket());
    println!("export REMOTE_DEVICE_HOST={remote}");
    Ok(())
}
