use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Deserialize;
use std::path::PathBuf;
use tokio::sync::mpsc;

const CREDENTIALS_FILE: &str = "credentials.json";

pub const SIGN_IN_HINT: &str =
    "Sign in on the storefront and save the issued token to the credentials file";

/// Bearer token minted by the storefront's identity provider. Token issuance
/// happens elsewhere; this file is where a signed-in session leaves it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_token: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }
}

#[derive(Debug, Clone)]
pub struct CredentialsStore {
    path: PathBuf,
}

impl CredentialsStore {
    pub fn new() -> Self {
        let path = dirs::config_dir()
            .map(|p| p.join("dinewatch").join(CREDENTIALS_FILE))
            .unwrap_or_else(|| PathBuf::from(CREDENTIALS_FILE));

        Self { path }
    }

    #[allow(dead_code)]
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Read fresh from disk. The token is re-read on every request so a
    /// re-login is picked up without restarting.
    pub fn load(&self) -> Result<Credentials> {
        let content = std::fs::read_to_string(&self.path).with_context(|| {
            format!("Failed to read credentials from {}", self.path.display())
        })?;

        serde_json::from_str(&content).context("Failed to parse credentials file")
    }

    pub fn bearer_token(&self) -> Result<String> {
        let credentials = self.load()?;
        if credentials.is_expired() {
            anyhow::bail!("Token expired. {SIGN_IN_HINT}");
        }
        Ok(credentials.access_token)
    }

    pub fn has_valid_credentials(&self) -> bool {
        self.load().map(|c| !c.is_expired()).unwrap_or(false)
    }
}

impl Default for CredentialsStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Watches the credentials file so the daemon can refresh immediately after
/// a re-login instead of waiting for the next poll.
pub struct CredentialsWatcher {
    _watcher: RecommendedWatcher,
}

impl CredentialsWatcher {
    pub fn start(path: PathBuf) -> Result<(Self, mpsc::UnboundedReceiver<()>)> {
        let (async_tx, async_rx) = mpsc::unbounded_channel::<()>();
        let (notify_tx, mut notify_rx) = mpsc::unbounded_channel::<()>();

        let filename = path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .context("Credentials path has no file name")?;

        let watched_name = filename.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| {
                if let Ok(event) = res {
                    if event.kind.is_modify() || event.kind.is_create() {
                        let matches = event.paths.iter().any(|p| {
                            p.file_name()
                                .is_some_and(|f| f.to_string_lossy() == watched_name)
                        });
                        if matches {
                            let _ = notify_tx.send(());
                        }
                    }
                }
            },
            Config::default(),
        )?;

        if let Some(parent) = path.parent() {
            if parent.exists() {
                watcher
                    .watch(parent, RecursiveMode::NonRecursive)
                    .with_context(|| {
                        format!("Failed to watch directory: {}", parent.display())
                    })?;
                tracing::info!(?parent, file = %filename, "Watching credentials directory");
            } else {
                tracing::warn!(
                    ?parent,
                    "Credentials directory does not exist, skipping watch"
                );
            }
        }

        // Editors and login flows write in bursts; debounce to one event.
        tokio::spawn(async move {
            while notify_rx.recv().await.is_some() {
                tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
                while notify_rx.try_recv().is_ok() {}

                tracing::info!("Credentials file changed on disk");
                let _ = async_tx.send(());
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn test_parse_credentials() {
        let json = r#"{ "accessToken": "tok_abc", "expiresAt": "2099-01-01T00:00:00Z" }"#;
        let credentials: Credentials = serde_json::from_str(json).unwrap();
        assert_eq!(credentials.access_token, "tok_abc");
        assert!(!credentials.is_expired());
    }

    #[test]
    fn test_missing_expiry_never_expires() {
        let json = r#"{ "accessToken": "tok_abc" }"#;
        let credentials: Credentials = serde_json::from_str(json).unwrap();
        assert!(!credentials.is_expired());
    }

    #[test]
    fn test_expired_token() {
        let credentials = Credentials {
            access_token: "tok_old".to_string(),
            expires_at: Some(Utc::now() - ChronoDuration::hours(1)),
        };
        assert!(credentials.is_expired());
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let store = CredentialsStore::at(PathBuf::from("/nonexistent/credentials.json"));
        assert!(!store.has_valid_credentials());
        assert!(store.bearer_token().is_err());
    }
}
