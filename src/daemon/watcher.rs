use parking_lot::Mutex;

use crate::core::notifications::send_status_notification;
use crate::core::store::{StatusBoard, StatusChange};
use crate::sources::StatusSource;

/// One watched resource: a source to poll, the last-seen statuses, and the
/// notification on every transition.
///
/// `poll_once` is the callback handed to the polling controller, so it owns
/// its errors end to end: a failed fetch is logged and swallowed, exactly
/// like the storefront's poll handlers, and never reaches the controller.
pub struct StatusWatcher {
    source: Box<dyn StatusSource>,
    board: Mutex<StatusBoard>,
    notify_enabled: bool,
}

impl StatusWatcher {
    pub fn new(source: Box<dyn StatusSource>, notify_enabled: bool) -> Self {
        Self {
            source,
            board: Mutex::new(StatusBoard::new()),
            notify_enabled,
        }
    }

    pub fn label(&self) -> &'static str {
        self.source.label()
    }

    pub async fn poll_once(&self) {
        let fresh = match self.source.fetch_statuses().await {
            Ok(fresh) => fresh,
            Err(e) => {
                tracing::debug!(label = self.label(), error = %e, "Poll fetch failed");
                return;
            }
        };

        let changes = self.board.lock().apply(fresh);
        for change in &changes {
            self.announce(change);
        }
    }

    fn announce(&self, change: &StatusChange) {
        tracing::info!(
            label = self.label(),
            id = %change.id,
            from = %change.from,
            to = %change.to,
            "Status changed"
        );

        if !self.notify_enabled {
            return;
        }

        if let Err(e) = send_status_notification(self.label(), &change.id, &change.to) {
            tracing::warn!(error = %e, "Failed to send notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct ScriptedSource {
        snapshots: Mutex<Vec<Result<Vec<(String, String)>, String>>>,
    }

    impl ScriptedSource {
        fn new(snapshots: Vec<Result<Vec<(String, String)>, String>>) -> Self {
            Self {
                snapshots: Mutex::new(snapshots),
            }
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        fn label(&self) -> &'static str {
            "Order"
        }

        async fn fetch_statuses(&self) -> Result<Vec<(String, String)>> {
            let mut snapshots = self.snapshots.lock();
            match snapshots.remove(0) {
                Ok(fresh) => Ok(fresh),
                Err(message) => Err(anyhow::anyhow!(message)),
            }
        }
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(id, status)| (id.to_string(), status.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_error_keeps_baseline() {
        let source = ScriptedSource::new(vec![
            Ok(pairs(&[("o1", "Pending")])),
            Err("backend down".to_string()),
            Ok(pairs(&[("o1", "Pending")])),
        ]);
        // Notifications off so the test stays headless.
        let watcher = Arc::new(StatusWatcher::new(Box::new(source), false));

        watcher.poll_once().await;
        watcher.poll_once().await;
        watcher.poll_once().await;

        assert_eq!(watcher.board.lock().status_of("o1"), Some("Pending"));
    }

    #[tokio::test]
    async fn test_poll_updates_board() {
        let source = ScriptedSource::new(vec![
            Ok(pairs(&[("o1", "Pending")])),
            Ok(pairs(&[("o1", "Processing")])),
        ]);
        let watcher = Arc::new(StatusWatcher::new(Box::new(source), false));

        watcher.poll_once().await;
        watcher.poll_once().await;

        assert_eq!(watcher.board.lock().status_of("o1"), Some("Processing"));
    }
}
