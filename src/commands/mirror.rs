//! The supervised mirror session.
//!
//! Reproduces the demo's screen-mirroring sequence under supervision: reset
//! the host ADB server onto all interfaces, resolve the tunnel host, run
//! scrcpy with `ADB_SERVER_SOCKET` pointed at that server, and tear both
//! down when scrcpy exits or the user hits Ctrl-C.

use std::time::Duration;

use anyhow::Context;
use tokio::process::Child;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::adb::AdbBridge;
use crate::config::Config;
use crate::scrcpy::ScrcpySession;
use crate::tunnel;

/// Grace period between the server reset and the scrcpy connection attempt.
const SERVER_SPINUP: Duration = Duration::from_millis(300);

/// How long to wait for the server child after asking it to stop.
const SERVER_REAP_TIMEOUT: Duration = Duration::from_secs(2);

pub async fn run(config: &Config, scrcpy_args: Vec<String>) -> anyhow::Result<()> {
    let adb = AdbBridge::from_config(config);

    info!("Resetting ADB server");
    adb.kill_server()
        .await
        .context("Failed to reset the ADB server")?;
    let mut server = adb
        .start_server()
        .context("Failed to start the ADB server")?;
    tokio::time::sleep(SERVER_SPINUP).await;

    let tunnel_host = tunnel::resolve_ipv4(&config.tunnel_host)
        .await
        .with_context(|| format!("Cannot resolve tunnel host `{}`", config.tunnel_host))?;
    info!("Resolved {} to {tunnel_host}", config.tunnel_host);

    let session = ScrcpySession::new(config, tunnel_host, adb.server_socket(), scrcpy_args);
    let mut scrcpy = match session.spawn() {
        Ok(child) => child,
        Err(e) => {
            shutdown_server(&adb, &mut server).await;
            return Err(e.into());
        }
    };

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let result = tokio::select! {
        status = scrcpy.wait() => match status {
            Ok(status) if status.success() => {
                info!("scrcpy exited");
                Ok(())
            }
            Ok(status) => Err(anyhow::anyhow!(
                "scrcpy exited with status {}",
                status.code().unwrap_or(-1)
            )),
            Err(e) => Err(anyhow::anyhow!("Failed to wait on scrcpy: {e}")),
        },
        status = server.wait() => {
            let _ = scrcpy.start_kill();
            let _ = scrcpy.wait().await;
            let code = status.map(|s| s.code().unwrap_or(-1)).unwrap_or(-1);
            Err(anyhow::anyhow!("ADB server exited early with status {code}"))
        }
        _ = cancel.cancelled() => {
            info!("Interrupted; closing mirror session");
            let _ = scrcpy.start_kill();
            let _ = scrcpy.wait().await;
            Ok(())
        }
    };

    shutdown_server(&adb, &mut server).await;
    result
}

/// Ordered teardown: ask the server to stop, then reap (or kill) the child.
async fn shutdown_server(adb: &AdbBridge, server: &mut Child) {
    if let Err(e) = adb.kill_server().await {
        warn!("Failed to stop ADB server: {e}");
    }
    match tokio::time::timeout(SERVER_REAP_TIMEOUT, server.wait()).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => warn!("Failed to reap ADB server child: {e}"),
        Err(_) => {
            warn!("ADB server did not stop in time; killing it");
            let _ = server.start_kill();
            let _ = server.wait().await;
        }
    }
}
