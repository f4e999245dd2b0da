//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Network reachability probe.
pub mod connectivity;
/// Flickr API client.
pub mod flickr;
/// Thumbnail cache and fetch worker.
pub mod image;
/// System notifications.
pub mod notifications;
/// Preference persistence.
pub mod preference_store;

pub use config::{AppConfig, CliArgs, Command, LogLevel, PollingSwitch, StorageManager};
pub use connectivity::{DEFAULT_PROBE_TIMEOUT, HttpConnectivityProbe};
pub use flickr::{FLICKR_API_BASE, FlickrClient};
pub use image::{
    CacheStats, Dispatch, FetchWorker, FetchWorkerConfig, ImageCache, ThumbnailCompletion,
};
pub use notifications::DesktopNotificationService;
pub use preference_store::PreferenceStore;
