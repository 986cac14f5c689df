//! # Server settings
//!
//! Layered with the `config` crate, lowest priority first:
//!
//! 1. built-in defaults,
//! 2. an optional `config.toml` in the working directory,
//! 3. `APP_*` environment variables, with `__` between nested keys
//!    (`APP_DATABASE__MAX_CONNECTIONS=10`, `APP_DASHBOARD__VIEW__PAGE_SIZE=8`).
//!
//! `DATABASE_URL` (read after `dotenvy` loads `.env`) overrides
//! `database.url`.

use std::sync::OnceLock;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use store::DashboardConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    /// Mark the session cookie `Secure`; enable behind HTTPS.
    pub secure: bool,
    pub expiry_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedSettings {
    pub capacity: usize,
    pub poll_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub session: SessionSettings,
    pub feed: FeedSettings,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseSettings {
                url: None,
                max_connections: 5,
            },
            session: SessionSettings {
                secure: false,
                expiry_days: 7,
            },
            feed: FeedSettings {
                capacity: crate::feed::FEED_CAPACITY,
                poll_timeout_secs: crate::feed::POLL_TIMEOUT.as_secs(),
            },
            dashboard: DashboardConfig::default(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::build(File::with_name("config.toml").format(FileFormat::Toml).required(false))
    }

    fn build(file: impl config::Source + Send + Sync + 'static) -> Result<Self, ConfigError> {
        let defaults = Settings::default();
        let config = Config::builder()
            .set_default("database.max_connections", defaults.database.max_connections)?
            .set_default("session.secure", defaults.session.secure)?
            .set_default("session.expiry_days", defaults.session.expiry_days)?
            .set_default("feed.capacity", defaults.feed.capacity as u64)?
            .set_default("feed.poll_timeout_secs", defaults.feed.poll_timeout_secs)?
            .add_source(file)
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut settings: Settings = config.try_deserialize()?;
        dotenvy::dotenv().ok();
        if let Ok(url) = std::env::var("DATABASE_URL") {
            settings.database.url = Some(url);
        }
        Ok(settings)
    }
}

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Process-wide settings, loaded on first use.
///
/// A broken configuration is logged and replaced by the defaults so the
/// server still starts.
pub fn settings() -> &'static Settings {
    SETTINGS.get_or_init(|| {
        Settings::new().unwrap_or_else(|e| {
            tracing::warn!("invalid configuration, using defaults: {e}");
            Settings::default()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(text: &str) -> Settings {
        Settings::build(File::from_str(text, FileFormat::Toml)).unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.database.max_connections, 5);
        assert_eq!(settings.session.expiry_days, 7);
        assert_eq!(settings.feed.capacity, 256);
        assert_eq!(settings.dashboard.view.page_size, 5);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let settings = from_toml(
            r#"
            [database]
            max_connections = 12

            [dashboard.view]
            page_size = 10

            [dashboard.notices]
            ttl_ms = 5000
            "#,
        );
        assert_eq!(settings.database.max_connections, 12);
        assert!(!settings.session.secure);
        assert_eq!(settings.feed.poll_timeout_secs, 25);
        assert_eq!(settings.dashboard.view.page_size, 10);
        assert_eq!(settings.dashboard.notices.ttl_ms, 5000);
        assert_eq!(settings.dashboard.search.debounce_ms, 300);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let settings = from_toml("");
        assert_eq!(settings.database.max_connections, 5);
        assert_eq!(settings.dashboard, DashboardConfig::default());
    }
}
