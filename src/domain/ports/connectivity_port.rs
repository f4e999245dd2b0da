//! Port for network reachability checks.

use async_trait::async_trait;

/// Reports whether the photo service can currently be reached.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectivityPort: Send + Sync {
    /// Returns true when a network connection is available.
    async fn is_connected(&self) -> bool;
}
