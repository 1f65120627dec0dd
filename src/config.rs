use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HealthConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub scoring: ScoringConfig,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

/// Constants feeding the score compounding engine.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScoringConfig {
    /// Running score before the first complete week.
    pub starting_score: f64,
    /// Expected 60-second heart rate drop after cardio, in BPM.
    pub cardio_recovery_baseline: i32,
    /// Length of the trailing resting heart rate window, in months.
    pub rhr_window_months: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub tick_secs: u64,
    pub request_timeout_secs: u64,
    pub ttl_secs: u64,
    pub token_lifetime_hours: i64,
    /// `sub` claim of every VAPID assertion.
    pub subject: String,
    pub vapid_public_key: Option<String>,
    pub vapid_private_key: Option<String>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            scoring: ScoringConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_data_dir()
            .join("health.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            starting_score: 1000.0,
            cardio_recovery_baseline: 25,
            rhr_window_months: 3,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_secs: 60,
            request_timeout_secs: 10,
            ttl_secs: 30,
            token_lifetime_hours: 24,
            subject: "mailto:admin@health-balance.local".into(),
            vapid_public_key: None,
            vapid_private_key: None,
        }
    }
}

/// Returns `~/.health-balance/`
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".health-balance")
}

/// Returns the default config file path: `~/.health-balance/config.toml`
pub fn default_config_path() -> PathBuf {
    default_data_dir().join("config.toml")
}

impl HealthConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            HealthConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (DB_PATH, VAPID_PUBLIC_KEY, VAPID_PRIVATE_KEY, HB_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DB_PATH") {
            self.storage.db_path = val;
        }
        if let Some(val) = non_empty_env("VAPID_PUBLIC_KEY") {
            self.notifications.vapid_public_key = Some(val);
        }
        if let Some(val) = non_empty_env("VAPID_PRIVATE_KEY") {
            self.notifications.vapid_private_key = Some(val);
        }
        if let Ok(val) = std::env::var("HB_LOG_LEVEL") {
            self.server.log_level = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = HealthConfig::default();
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.scoring.starting_score, 1000.0);
        assert_eq!(config.scoring.cardio_recovery_baseline, 25);
        assert_eq!(config.notifications.tick_secs, 60);
        assert!(config.notifications.vapid_private_key.is_none());
        assert!(config.storage.db_path.ends_with("health.db"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"

[storage]
db_path = "/tmp/test.db"

[scoring]
cardio_recovery_baseline = 20

[notifications]
subject = "mailto:me@example.com"
vapid_private_key = "abc"
"#;
        let config: HealthConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.storage.db_path, "/tmp/test.db");
        assert_eq!(config.scoring.cardio_recovery_baseline, 20);
        assert_eq!(config.notifications.subject, "mailto:me@example.com");
        assert_eq!(config.notifications.vapid_private_key.as_deref(), Some("abc"));
        // defaults still apply for unset fields
        assert_eq!(config.scoring.starting_score, 1000.0);
        assert_eq!(config.notifications.request_timeout_secs, 10);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = HealthConfig::default();
        std::env::set_var("DB_PATH", "/tmp/override.db");
        std::env::set_var("VAPID_PRIVATE_KEY", "private");
        std::env::set_var("VAPID_PUBLIC_KEY", "");
        std::env::set_var("HB_LOG_LEVEL", "trace");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.notifications.vapid_private_key.as_deref(), Some("private"));
        // blank keys count as unset
        assert!(config.notifications.vapid_public_key.is_none());
        assert_eq!(config.server.log_level, "trace");

        // Clean up
        std::env::remove_var("DB_PATH");
        std::env::remove_var("VAPID_PRIVATE_KEY");
        std::env::remove_var("VAPID_PUBLIC_KEY");
        std::env::remove_var("HB_LOG_LEVEL");
    }
}
