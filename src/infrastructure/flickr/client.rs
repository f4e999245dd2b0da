//! Flickr REST API client.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, trace, warn};

use super::dto::PhotosResponse;
use crate::domain::entities::{FIRST_PAGE, GalleryItem};
use crate::domain::errors::FetchError;
use crate::domain::ports::{ImageFetchPort, PhotoSourcePort};

/// Default REST endpoint.
pub const FLICKR_API_BASE: &str = "https://api.flickr.com/services/rest/";
const USER_AGENT: &str = concat!("photogallery/", env!("CARGO_PKG_VERSION"));

const METHOD_RECENT: &str = "flickr.photos.getRecent";
const METHOD_SEARCH: &str = "flickr.photos.search";
const EXTRA_SMALL_URL: &str = "url_s";

/// Client for the Flickr photo listing API and its image hosts.
pub struct FlickrClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FlickrClient {
    /// Creates new client against the public endpoint.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        Self::with_base_url(FLICKR_API_BASE, api_key, timeout)
    }

    /// Creates client with custom base URL.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Returns the REST endpoint this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lists recent photos, reporting failures.
    ///
    /// # Errors
    /// Returns [`FetchError`] on transport failure or malformed response.
    pub async fn try_fetch_recent(&self, page: u32) -> Result<Vec<GalleryItem>, FetchError> {
        self.fetch_items(METHOD_RECENT, None, page).await
    }

    /// Searches photos, reporting failures.
    ///
    /// # Errors
    /// Returns [`FetchError`] on transport failure or malformed response.
    pub async fn try_search(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Vec<GalleryItem>, FetchError> {
        self.fetch_items(METHOD_SEARCH, Some(query), page).await
    }

    fn query_params(
        &self,
        method: &'static str,
        text: Option<&str>,
        page: u32,
    ) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("method", method.to_string()),
            ("api_key", self.api_key.clone()),
            ("format", "json".to_string()),
            ("nojsoncallback", "1".to_string()),
            ("extras", EXTRA_SMALL_URL.to_string()),
            ("page", page.max(FIRST_PAGE).to_string()),
        ];
        if let Some(text) = text {
            params.push(("text", text.to_string()));
        }
        params
    }

    async fn fetch_items(
        &self,
        method: &'static str,
        text: Option<&str>,
        page: u32,
    ) -> Result<Vec<GalleryItem>, FetchError> {
        let params = self.query_params(method, text, page);

        debug!(method, page, "Requesting photo page");

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::network(format!("HTTP {status}")));
        }

        let body = response.text().await?;
        trace!(bytes = body.len(), "Received photo listing");

        parse_items(&body)
    }
}

/// Parses a listing response, dropping records without a small-image URL.
///
/// # Errors
/// Returns [`FetchError::Decode`] if the body is not a successful listing.
pub fn parse_items(body: &str) -> Result<Vec<GalleryItem>, FetchError> {
    let response: PhotosResponse = serde_json::from_str(body)?;

    if response.stat.as_deref() == Some("fail") {
        return Err(FetchError::decode(format!(
            "service reported failure: {}",
            response.message.unwrap_or_default()
        )));
    }

    let page = response
        .photos
        .ok_or_else(|| FetchError::decode("response has no photos object"))?;

    let total = page.photo.len();
    let items: Vec<GalleryItem> = page
        .photo
        .into_iter()
        .filter_map(|record| {
            let url = record.url_s.filter(|u| !u.is_empty())?;
            Some(GalleryItem::new(record.id, record.title, Some(url)))
        })
        .collect();

    debug!(
        page = page.page,
        pages = page.pages,
        per_page = page.perpage,
        kept = items.len(),
        dropped = total - items.len(),
        "Parsed photo page"
    );

    Ok(items)
}

#[async_trait]
impl PhotoSourcePort for FlickrClient {
    async fn fetch_recent(&self, page: u32) -> Vec<GalleryItem> {
        self.try_fetch_recent(page).await.unwrap_or_else(|e| {
            warn!(page, error = %e, "Failed to fetch recent photos");
            Vec::new()
        })
    }

    async fn search(&self, query: &str, page: u32) -> Vec<GalleryItem> {
        let query = query.trim();
        if query.is_empty() {
            warn!("Ignoring search with a blank query");
            return Vec::new();
        }

        self.try_search(query, page).await.unwrap_or_else(|e| {
            warn!(query, page, error = %e, "Failed to search photos");
            Vec::new()
        })
    }
}

#[async_trait]
impl ImageFetchPort for FlickrClient {
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::network(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        Ok(response.bytes().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const LISTING: &str = r#"{
        "photos": {
            "page": 1, "pages": 10, "perpage": 100, "total": 1000,
            "photo": [
                {"id": "1", "title": "first", "url_s": "https://live.example/1_s.jpg"},
                {"id": "2", "title": "no thumbnail"},
                {"id": "3", "title": "third", "url_s": "https://live.example/3_s.jpg"},
                {"id": "4", "title": "empty", "url_s": ""},
                {"id": "5", "title": "fifth", "url_s": "https://live.example/5_s.jpg"}
            ]
        },
        "stat": "ok"
    }"#;

    fn client_for(server: &Server) -> FlickrClient {
        FlickrClient::with_base_url(
            format!("{}/services/rest/", server.url()),
            "test-key",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_keeps_order_and_drops_missing_urls() {
        let items = parse_items(LISTING).unwrap();
        let ids: Vec<_> = items.iter().map(GalleryItem::id).collect();
        assert_eq!(ids, vec!["1", "3", "5"]);
        assert_eq!(items[1].caption(), "third");
    }

    #[test]
    fn test_parse_failure_stat() {
        let body = r#"{"stat": "fail", "code": 100, "message": "Invalid API Key"}"#;
        let err = parse_items(body).unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[test]
    fn test_parse_malformed_json() {
        let err = parse_items("jsonFlickrApi({").unwrap_err();
        assert!(!err.is_network_error());
    }

    #[tokio::test]
    async fn test_fetch_recent_sends_expected_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/services/rest/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("method".into(), METHOD_RECENT.into()),
                Matcher::UrlEncoded("api_key".into(), "test-key".into()),
                Matcher::UrlEncoded("format".into(), "json".into()),
                Matcher::UrlEncoded("nojsoncallback".into(), "1".into()),
                Matcher::UrlEncoded("extras".into(), "url_s".into()),
                Matcher::UrlEncoded("page".into(), "2".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(LISTING)
            .create_async()
            .await;

        let items = client_for(&server).fetch_recent(2).await;

        mock.assert_async().await;
        assert_eq!(items.len(), 3);
    }

    #[tokio::test]
    async fn test_search_sends_text() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/services/rest/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("method".into(), METHOD_SEARCH.into()),
                Matcher::UrlEncoded("text".into(), "red panda".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(LISTING)
            .create_async()
            .await;

        let items = client_for(&server).search("red panda", 0).await;

        mock.assert_async().await;
        assert_eq!(items.len(), 3);
    }

    #[tokio::test]
    async fn test_server_error_yields_empty() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/services/rest/")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let client = client_for(&server);
        assert!(client.fetch_recent(1).await.is_empty());
        let err = client.try_fetch_recent(1).await.unwrap_err();
        assert!(err.is_network_error());
    }

    #[tokio::test]
    async fn test_blank_search_skips_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/services/rest/")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        assert!(client_for(&server).search("  ", 1).await.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_bytes_rejects_non_success() {
        let mut server = Server::new_async().await;
        let _ok = server
            .mock("GET", "/img/ok.png")
            .with_status(200)
            .with_body(b"PNGDATA")
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/img/gone.png")
            .with_status(404)
            .create_async()
            .await;

        let client = client_for(&server);
        let bytes = client
            .fetch_bytes(&format!("{}/img/ok.png", server.url()))
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"PNGDATA");

        let err = client
            .fetch_bytes(&format!("{}/img/gone.png", server.url()))
            .await
            .unwrap_err();
        assert!(err.is_network_error());
    }
}
