use std::sync::Arc;
use tokio::sync::watch;

/// Process-wide flag for "can the user currently see this session".
///
/// In the daemon this is driven by the screensaver bridge (locked screen =
/// hidden); tests drive it directly. Clones share the underlying channel, so
/// any clone may flip the flag and every subscriber observes the change.
#[derive(Clone)]
pub struct VisibilitySignal {
    tx: Arc<watch::Sender<bool>>,
}

impl VisibilitySignal {
    pub fn new(initially_visible: bool) -> Self {
        let (tx, _rx) = watch::channel(initially_visible);
        Self { tx: Arc::new(tx) }
    }

    /// A signal that starts out visible.
    pub fn visible() -> Self {
        Self::new(true)
    }

    #[allow(dead_code)]
    pub fn is_visible(&self) -> bool {
        *self.tx.borrow()
    }

    /// Flip the flag. Subscribers are only woken on an actual transition,
    /// matching how visibility-change events fire only on change.
    pub fn set_visible(&self, visible: bool) {
        self.tx.send_if_modified(|current| {
            if *current == visible {
                false
            } else {
                *current = visible;
                true
            }
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for VisibilitySignal {
    fn default() -> Self {
        Self::visible()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initial_state() {
        assert!(VisibilitySignal::visible().is_visible());
        assert!(!VisibilitySignal::new(false).is_visible());
    }

    #[tokio::test]
    async fn test_transition_wakes_subscriber() {
        let signal = VisibilitySignal::visible();
        let mut rx = signal.subscribe();

        signal.set_visible(false);
        rx.changed().await.unwrap();
        assert!(!*rx.borrow_and_update());

        signal.set_visible(true);
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());
    }

    #[tokio::test]
    async fn test_redundant_set_does_not_notify() {
        let signal = VisibilitySignal::visible();
        let mut rx = signal.subscribe();
        rx.borrow_and_update();

        signal.set_visible(true);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let signal = VisibilitySignal::visible();
        let clone = signal.clone();

        clone.set_visible(false);
        assert!(!signal.is_visible());
    }
}
