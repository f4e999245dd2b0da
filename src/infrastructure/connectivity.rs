//! Network reachability probe.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::domain::errors::FetchError;
use crate::domain::ports::ConnectivityPort;

/// Probe timeout used when none is configured.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Checks reachability by sending a HEAD request to the photo service.
///
/// Any HTTP response, whatever its status, counts as connected.
pub struct HttpConnectivityProbe {
    client: Client,
    url: String,
}

impl HttpConnectivityProbe {
    /// Creates a probe against `url`.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ConnectivityPort for HttpConnectivityProbe {
    async fn is_connected(&self) -> bool {
        match self.client.head(&self.url).send().await {
            Ok(response) => {
                debug!(status = %response.status(), "Connectivity probe answered");
                true
            }
            Err(e) => {
                debug!(error = %e, "Connectivity probe failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_any_response_means_connected() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("HEAD", "/")
            .with_status(405)
            .create_async()
            .await;

        let probe = HttpConnectivityProbe::new(server.url(), DEFAULT_PROBE_TIMEOUT).unwrap();
        assert!(probe.is_connected().await);
    }

    #[tokio::test]
    async fn test_unreachable_host_means_offline() {
        let probe =
            HttpConnectivityProbe::new("http://127.0.0.1:1/", Duration::from_secs(1)).unwrap();
        assert!(!probe.is_connected().await);
    }
}
