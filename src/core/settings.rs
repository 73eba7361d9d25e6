use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub poll: PollSettings,
    pub notifications: NotificationSettings,
    pub debug: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Poll periods for the two watched resources, in seconds. The storefront
/// polled both views every 6 seconds; 0 disables a watcher entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    pub order_interval_secs: u64,
    pub reservation_interval_secs: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            order_interval_secs: 6,
            reservation_interval_secs: 6,
        }
    }
}

impl PollSettings {
    pub fn order_interval(&self) -> Duration {
        Duration::from_secs(self.order_interval_secs)
    }

    pub fn reservation_interval(&self) -> Duration {
        Duration::from_secs(self.reservation_interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub enabled: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dinewatch").join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path().context("Could not determine config directory")?;

        if !path.exists() {
            tracing::info!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(?path, "Loaded config");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            anyhow::bail!("api.base_url must not be empty");
        }
        if self.api.timeout_secs == 0 {
            anyhow::bail!("api.timeout_secs must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.api.base_url, "http://localhost:5000");
        assert_eq!(settings.poll.order_interval_secs, 6);
        assert_eq!(settings.poll.reservation_interval_secs, 6);
        assert!(settings.notifications.enabled);
        assert!(!settings.debug);
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());

        settings.api.base_url = String::new();
        assert!(settings.validate().is_err());

        settings.api.base_url = "http://localhost:5000".to_string();
        settings.api.timeout_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            debug = true

            [api]
            base_url = "https://restaurant.example.com"

            [poll]
            order_interval_secs = 10
            reservation_interval_secs = 0

            [notifications]
            enabled = false
        "#;

        let settings: Settings = toml::from_str(toml).unwrap();
        assert!(settings.debug);
        assert_eq!(settings.api.base_url, "https://restaurant.example.com");
        assert_eq!(settings.api.timeout_secs, 10);
        assert_eq!(settings.poll.order_interval_secs, 10);
        assert_eq!(settings.poll.reservation_interval_secs, 0);
        assert!(settings.poll.reservation_interval().is_zero());
        assert!(!settings.notifications.enabled);
    }
}
