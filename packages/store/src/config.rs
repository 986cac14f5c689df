//! # Dashboard configuration (`dashboard.toml`)
//!
//! Tunables for the dashboard controller and its UI glue. The server loads
//! them as part of its settings and serves them to the client, so the same
//! struct is (de)serialised both as TOML and over the wire.
//!
//! ## Structure
//!
//! ```toml
//! [view]
//! page_size = 5          # students per page
//!
//! [notices]
//! ttl_ms = 3000          # how long success/error banners stay visible
//!
//! [search]
//! debounce_ms = 300      # quiet period before a search recompute
//! ```
//!
//! Every section has `#[serde(default)]`, so a missing or empty file is the
//! default configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::view::DEFAULT_PAGE_SIZE;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub notices: NoticeConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoticeConfig {
    #[serde(default = "default_notice_ttl")]
    pub ttl_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_notice_ttl() -> u64 {
    3000
}

fn default_debounce() -> u64 {
    300
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_notice_ttl(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce(),
        }
    }
}

impl DashboardConfig {
    pub fn filename() -> &'static str {
        "dashboard.toml"
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.view.page_size = page_size;
        self
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notices.ttl_ms)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = DashboardConfig::from_toml("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.view.page_size, 5);
        assert_eq!(config.notice_ttl(), Duration::from_millis(3000));
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_partial_override() {
        let config = DashboardConfig::from_toml("[view]\npage_size = 20\n").unwrap();
        assert_eq!(config.view.page_size, 20);
        assert_eq!(config.notices.ttl_ms, 3000);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = DashboardConfig::default().with_page_size(8);
        let text = config.to_toml().unwrap();
        assert_eq!(DashboardConfig::from_toml(&text).unwrap(), config);
    }
}
