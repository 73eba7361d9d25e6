use anyhow::Result;
use notify_rust::Notification;

/// Desktop notification for a status transition, e.g.
/// "Order Updated: Processing".
pub fn send_status_notification(label: &str, id: &str, status: &str) -> Result<()> {
    Notification::new()
        .summary(&format!("{label} Updated: {status}"))
        .body(&format!("{label} {id} is now {status}."))
        .appname("dinewatch")
        .timeout(notify_rust::Timeout::Milliseconds(5000))
        .show()?;

    tracing::info!(label, id, status, "Sent status notification");

    Ok(())
}
