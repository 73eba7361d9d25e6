use anyhow::{Context, Result};
use futures_util::StreamExt;

use crate::poll::VisibilitySignal;

const SCREENSAVER_DEST: &str = "org.freedesktop.ScreenSaver";
const SCREENSAVER_PATH: &str = "/org/freedesktop/ScreenSaver";

/// Drives the visibility signal from the desktop lock state: a locked
/// screen counts as hidden. Runs until the D-Bus connection drops; if the
/// screensaver service is unavailable the signal simply stays visible.
pub async fn run_visibility_bridge(signal: VisibilitySignal) -> Result<()> {
    let connection = zbus::Connection::session()
        .await
        .context("Failed to connect to session D-Bus")?;

    let proxy = zbus::Proxy::new(
        &connection,
        SCREENSAVER_DEST,
        SCREENSAVER_PATH,
        SCREENSAVER_DEST,
    )
    .await
    .context("Failed to create ScreenSaver proxy")?;

    match proxy.call_method("GetActive", &()).await {
        Ok(reply) => {
            if let Ok(active) = reply.body().deserialize::<bool>() {
                signal.set_visible(!active);
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "ScreenSaver.GetActive unavailable, assuming visible");
        }
    }

    let mut stream = proxy
        .receive_signal("ActiveChanged")
        .await
        .context("Failed to subscribe to ActiveChanged")?;

    while let Some(message) = stream.next().await {
        match message.body().deserialize::<bool>() {
            Ok(active) => {
                tracing::debug!(locked = active, "Screen lock state changed");
                signal.set_visible(!active);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Malformed ActiveChanged signal");
            }
        }
    }

    Ok(())
}
