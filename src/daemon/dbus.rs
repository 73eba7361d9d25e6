use anyhow::{Context, Result};
use tokio::sync::mpsc;
use zbus::interface;

use crate::daemon::{DBUS_NAME, DBUS_PATH};

#[derive(Debug, Clone, Copy)]
pub enum DbusCommand {
    Refresh,
}

struct DinewatchService {
    cmd_tx: mpsc::UnboundedSender<DbusCommand>,
}

#[interface(name = "com.github.dinewatch.Dinewatch")]
impl DinewatchService {
    /// Force an immediate poll of every watched resource.
    async fn refresh(&self) -> zbus::fdo::Result<()> {
        tracing::info!("D-Bus Refresh called");
        let _ = self.cmd_tx.send(DbusCommand::Refresh);
        Ok(())
    }
}

pub async fn start_dbus_server(
    cmd_tx: mpsc::UnboundedSender<DbusCommand>,
) -> Result<zbus::Connection> {
    let connection = zbus::connection::Builder::session()
        .context("Failed to connect to session D-Bus")?
        .name(DBUS_NAME)
        .context("Failed to claim D-Bus name - is another daemon running?")?
        .serve_at(DBUS_PATH, DinewatchService { cmd_tx })
        .context("Failed to register D-Bus interface")?
        .build()
        .await
        .context("Failed to start D-Bus server")?;

    tracing::info!(name = DBUS_NAME, path = DBUS_PATH, "D-Bus service started");
    Ok(connection)
}
