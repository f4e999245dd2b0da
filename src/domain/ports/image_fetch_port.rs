//! Port for downloading raw image bytes.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::FetchError;

/// Port for fetching encoded image bytes by URL.
#[async_trait]
pub trait ImageFetchPort: Send + Sync {
    /// Downloads the resource at `url`.
    ///
    /// # Errors
    /// Returns [`FetchError::Network`] on transport failure or non-2xx status.
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, FetchError>;
}

#[cfg(test)]
#[allow(dead_code)]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::io::Cursor;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tokio::sync::Semaphore;

    /// Encodes a blank RGB image of the given size as PNG.
    pub fn png_bytes(width: u32, height: u32) -> Bytes {
        let img = image::DynamicImage::new_rgb8(width, height);
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        Bytes::from(buf)
    }

    /// In-memory image server recording every requested URL.
    #[derive(Default)]
    pub struct MockImageFetcher {
        images: Mutex<HashMap<String, Bytes>>,
        failing: Mutex<HashSet<String>>,
        pub requests: Arc<Mutex<Vec<String>>>,
        gate: Option<Arc<Semaphore>>,
    }

    impl MockImageFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Every fetch waits for one permit on `gate` before answering.
        pub fn gated(gate: Arc<Semaphore>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::default()
            }
        }

        pub fn with_image(self, url: &str, width: u32, height: u32) -> Self {
            self.images
                .lock()
                .insert(url.to_string(), png_bytes(width, height));
            self
        }

        pub fn with_bytes(self, url: &str, bytes: &'static [u8]) -> Self {
            self.images
                .lock()
                .insert(url.to_string(), Bytes::from_static(bytes));
            self
        }

        pub fn with_failure(self, url: &str) -> Self {
            self.failing.lock().insert(url.to_string());
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requests.lock().clone()
        }
    }

    #[async_trait]
    impl ImageFetchPort for MockImageFetcher {
        async fn fetch_bytes(&self, url: &str) -> Result<Bytes, FetchError> {
            self.requests.lock().push(url.to_string());
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
            if self.failing.lock().contains(url) {
                return Err(FetchError::network("HTTP 404 Not Found"));
            }
            self.images
                .lock()
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::network(format!("no such image: {url}")))
        }
    }
}
