//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::args::CliArgs;
use super::storage::{APP_NAME, APP_ORGANIZATION, APP_QUALIFIER, CONFIG_FILE_NAME};

const DEFAULT_API_BASE: &str = "https://api.flickr.com/services/rest/";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Converts to tracing level.
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, read from `config.toml` and overridden by CLI.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Photo service settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Thumbnail cache sizing.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Background polling settings.
    #[serde(default)]
    pub poll: PollConfig,

    /// Notification configuration.
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

/// Photo service configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// REST endpoint.
    #[serde(default = "default_api_base")]
    pub base_url: String,

    /// API key; usually supplied through `FLICKR_API_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Thumbnail cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Memory budget the cache is sized against, in megabytes.
    #[serde(default = "default_memory_budget_mb")]
    pub memory_budget_mb: u64,

    /// Share of the budget given to decoded thumbnails.
    #[serde(default = "default_memory_fraction")]
    pub memory_fraction: f64,
}

impl CacheConfig {
    /// Memory budget in bytes.
    #[must_use]
    pub const fn budget_bytes(&self) -> u64 {
        self.memory_budget_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_budget_mb: default_memory_budget_mb(),
            memory_fraction: default_memory_fraction(),
        }
    }
}

/// Background polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds between poll cycles.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Seconds after which a poll cycle is abandoned.
    #[serde(default = "default_cycle_timeout_secs")]
    pub cycle_timeout_secs: u64,
}

impl PollConfig {
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    #[must_use]
    pub const fn cycle_timeout(&self) -> Duration {
        Duration::from_secs(self.cycle_timeout_secs)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            cycle_timeout_secs: default_cycle_timeout_secs(),
        }
    }
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Show desktop notifications for new pictures.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_memory_budget_mb() -> u64 {
    512
}

const fn default_memory_fraction() -> f64 {
    0.10
}

const fn default_interval_secs() -> u64 {
    60
}

const fn default_cycle_timeout_secs() -> u64 {
    30
}

const fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(api_key) = &args.api_key {
            self.api.api_key = Some(api_key.clone());
        }
        if let Some(base_url) = &args.api_base_url {
            self.api.base_url.clone_from(base_url);
        }
        if let Some(notifications) = args.enable_desktop_notifications {
            self.notifications.enabled = notifications;
        }
        if let Some(interval) = args.poll_interval_secs {
            self.poll.interval_secs = interval;
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("photogallery.log"))
    }

    /// Returns effective config path.
    #[must_use]
    pub fn effective_config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Self::default_config_path)
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r#"
            log_level = "debug"

            [api]
            api_key = "abc123"

            [poll]
            interval_secs = 900

            [notifications]
            enabled = false
        "#;

        let config: AppConfig = toml::from_str(toml_content).expect("Failed to parse config");

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.api.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.api.base_url, DEFAULT_API_BASE);
        assert_eq!(config.poll.interval(), Duration::from_secs(900));
        assert_eq!(config.poll.cycle_timeout_secs, 30);
        assert!(!config.notifications.enabled);
        assert_eq!(config.cache.memory_budget_mb, 512);
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.api.api_key.is_none());
        assert_eq!(config.poll.interval_secs, 60);
        assert!((config.cache.memory_fraction - 0.10).abs() < f64::EPSILON);
        assert_eq!(config.cache.budget_bytes(), 512 * 1024 * 1024);
        assert!(config.notifications.enabled);
    }

    #[test]
    fn test_default_config_serializes_without_secrets() {
        let content = toml::to_string_pretty(&AppConfig::default()).unwrap();
        assert!(!content.contains("api_key"));

        let parsed: AppConfig = toml::from_str(&content).unwrap();
        assert_eq!(parsed.api.timeout_secs, 30);
    }

    #[test]
    fn test_merge_with_args() {
        let args = CliArgs::parse_from([
            "photogallery",
            "--log-level",
            "trace",
            "--api-key",
            "from-cli",
            "--enable-desktop-notifications",
            "false",
            "list",
        ]);
        let mut config = AppConfig::default();
        config.merge_with_args(&args);

        assert_eq!(config.log_level, LogLevel::Trace);
        assert_eq!(config.api.api_key.as_deref(), Some("from-cli"));
        assert!(!config.notifications.enabled);
        assert_eq!(config.poll.interval_secs, 60);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let api = ApiConfig {
            api_key: Some("secret-key".to_string()),
            ..ApiConfig::default()
        };
        let rendered = format!("{api:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("REDACTED"));
    }
}
