//! Application configuration.

pub mod app_config;
pub mod args;
pub mod storage;

pub use app_config::{
    ApiConfig, AppConfig, CacheConfig, LogLevel, NotificationsConfig, PollConfig,
};
pub use args::{CliArgs, Command, PollingSwitch};
pub use storage::{ConfigError, StorageManager, write_atomic};
