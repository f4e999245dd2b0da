//! Port for listing photos from the remote service.

use async_trait::async_trait;

use crate::domain::entities::GalleryItem;

/// Number of results the remote service returns per page.
pub const PAGE_SIZE: u32 = 100;

/// Port for paged photo listings.
///
/// Implementations swallow every failure: an empty vector means "no results
/// this time" and is indistinguishable from "no more results exist".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoSourcePort: Send + Sync {
    /// Lists recent photos for the given 1-based page.
    async fn fetch_recent(&self, page: u32) -> Vec<GalleryItem>;

    /// Searches photos matching `query` for the given 1-based page.
    async fn search(&self, query: &str, page: u32) -> Vec<GalleryItem>;
}

/// Lists recent photos, or searches when a query is given.
pub async fn fetch_page(
    source: &dyn PhotoSourcePort,
    query: Option<&str>,
    page: u32,
) -> Vec<GalleryItem> {
    match query {
        Some(query) => source.search(query, page).await,
        None => source.fetch_recent(page).await,
    }
}
