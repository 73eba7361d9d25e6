mod dbus;
mod screensaver;
mod watcher;

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::api::ApiClient;
use crate::core::credentials::{CredentialsStore, CredentialsWatcher, SIGN_IN_HINT};
use crate::core::settings::Settings;
use crate::daemon::dbus::{start_dbus_server, DbusCommand};
use crate::daemon::watcher::StatusWatcher;
use crate::poll::{PollController, VisibilitySignal};
use crate::sources::{OrderSource, ReservationSource};

pub const DBUS_NAME: &str = "com.github.dinewatch.Dinewatch";
pub const DBUS_PATH: &str = "/com/github/dinewatch/Dinewatch";

pub async fn run() -> Result<()> {
    tracing::info!("Starting dinewatch daemon");

    let settings = Settings::load()?;
    settings.validate()?;

    let credentials = CredentialsStore::new();
    if !credentials.has_valid_credentials() {
        tracing::warn!("No valid credentials yet. {SIGN_IN_HINT}");
    }

    let client = ApiClient::new(&settings, credentials.clone())?;

    let signal = VisibilitySignal::visible();
    {
        let signal = signal.clone();
        tokio::spawn(async move {
            if let Err(e) = screensaver::run_visibility_bridge(signal).await {
                tracing::warn!(error = %e, "Visibility bridge unavailable, polling stays active");
            }
        });
    }

    let notify_enabled = settings.notifications.enabled;
    let mut watchers: Vec<Arc<StatusWatcher>> = Vec::new();
    let mut controllers: Vec<PollController> = Vec::new();

    let sessions = [
        (
            Arc::new(StatusWatcher::new(
                Box::new(OrderSource::new(client.clone())),
                notify_enabled,
            )),
            settings.poll.order_interval(),
        ),
        (
            Arc::new(StatusWatcher::new(
                Box::new(ReservationSource::new(client.clone())),
                notify_enabled,
            )),
            settings.poll.reservation_interval(),
        ),
    ];

    for (watcher, interval) in sessions {
        if interval.is_zero() {
            tracing::info!(label = watcher.label(), "Polling disabled by config");
            continue;
        }

        let mut controller = PollController::new(signal.clone());
        let callback_watcher = Arc::clone(&watcher);
        controller.activate(
            move || {
                let watcher = Arc::clone(&callback_watcher);
                async move { watcher.poll_once().await }
            },
            interval,
        );
        tracing::info!(label = watcher.label(), ?interval, "Poll session started");

        watchers.push(watcher);
        controllers.push(controller);
    }

    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<DbusCommand>();
    let _dbus_connection = start_dbus_server(cmd_tx).await?;

    let (_cred_watcher, mut cred_rx) = CredentialsWatcher::start(credentials.path().clone())?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown requested");
                break;
            }
            Some(cmd) = cmd_rx.recv() => {
                match cmd {
                    DbusCommand::Refresh => refresh_all(&watchers).await,
                }
            }
            Some(()) = cred_rx.recv() => {
                tracing::info!("Credentials changed, refreshing immediately");
                refresh_all(&watchers).await;
            }
        }
    }

    for controller in &mut controllers {
        controller.shutdown();
    }
    tracing::info!("Daemon stopped");

    Ok(())
}

/// Out-of-band catch-up poll, outside the controllers' schedule.
async fn refresh_all(watchers: &[Arc<StatusWatcher>]) {
    for watcher in watchers {
        watcher.poll_once().await;
    }
}
