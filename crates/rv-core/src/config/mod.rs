//! # Configuration DTO / 配置数据
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Define configuration data structures
//! - ✅ Provide TOML → DTO mapping
//!
//! ## Prohibited / 禁止事项
//!
//! ❌ **No validation logic**. An empty backend URL is a fact, not an error;
//! bootstrap decides what to do with it.
//!
//! The only values filled in here are the documented query-cache and route
//! defaults, so that a config file may omit those sections entirely.

use std::path::PathBuf;

use crate::routes::RouteTable;

/// Extra attempts made by every record fetch before reporting a failure.
pub const DEFAULT_FETCH_RETRY: u32 = 1;

/// Age after which cached records are considered stale.
pub const DEFAULT_STALE_TIME_SECS: u64 = 60;

/// Application configuration DTO (pure data)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the hosted backend (may be empty)
    pub backend_url: String,

    /// Public (anonymous) API key sent with every request
    pub anon_key: String,

    /// Fixed retry count applied to all record fetches
    pub fetch_retry: u32,

    /// Cache stale time in seconds
    pub stale_time_secs: u64,

    /// Where the session snapshot is persisted (path only, no existence check)
    pub session_file: PathBuf,

    /// Log directory for the file appender
    pub logs_dir: PathBuf,

    /// Screen paths
    pub routes: RouteTable,
}

impl AppConfig {
    /// Create AppConfig from a TOML value.
    ///
    /// ```toml
    /// [backend]
    /// url = "https://xyz.supabase.co"
    /// anon_key = "..."
    ///
    /// [query]
    /// retry = 1
    /// stale_time_secs = 60
    ///
    /// [storage]
    /// session_file = "/path/to/session.json"
    /// logs_dir = "/path/to/logs"
    ///
    /// [routes]
    /// login = "/(auth)/login"
    /// ```
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let section_str = |section: &str, key: &str| -> Option<String> {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };
        let section_int = |section: &str, key: &str| -> Option<i64> {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_integer())
        };

        let defaults = RouteTable::default();
        let routes = RouteTable {
            login: section_str("routes", "login").unwrap_or(defaults.login),
            gender_onboarding: section_str("routes", "gender_onboarding")
                .unwrap_or(defaults.gender_onboarding),
            preferences_onboarding: section_str("routes", "preferences_onboarding")
                .unwrap_or(defaults.preferences_onboarding),
            home: section_str("routes", "home").unwrap_or(defaults.home),
        };

        Ok(Self {
            backend_url: section_str("backend", "url").unwrap_or_default(),
            anon_key: section_str("backend", "anon_key").unwrap_or_default(),
            fetch_retry: section_int("query", "retry")
                .map(|v| u32::try_from(v.max(0)).unwrap_or(u32::MAX))
                .unwrap_or(DEFAULT_FETCH_RETRY),
            stale_time_secs: section_int("query", "stale_time_secs")
                .map(|v| u64::try_from(v.max(0)).unwrap_or(u64::MAX))
                .unwrap_or(DEFAULT_STALE_TIME_SECS),
            session_file: PathBuf::from(
                section_str("storage", "session_file").unwrap_or_default(),
            ),
            logs_dir: PathBuf::from(section_str("storage", "logs_dir").unwrap_or_default()),
            routes,
        })
    }

    /// Create empty AppConfig (empty backend, empty paths, default query/routes)
    pub fn empty() -> Self {
        Self {
            backend_url: String::new(),
            anon_key: String::new(),
            fetch_retry: DEFAULT_FETCH_RETRY,
            stale_time_secs: DEFAULT_STALE_TIME_SECS,
            session_file: PathBuf::new(),
            logs_dir: PathBuf::new(),
            routes: RouteTable::default(),
        }
    }

    /// Create AppConfig with paths rooted at the given data directory.
    ///
    /// The data directory is computed by the caller (e.g. with the `dirs` crate).
    pub fn with_system_defaults(data_dir: PathBuf) -> Self {
        Self {
            session_file: data_dir.join("session.json"),
            logs_dir: data_dir.join("logs"),
            ..Self::empty()
        }
    }
}
