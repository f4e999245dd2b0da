//! Caller-driven pagination over the photo listing.

use tracing::{debug, info};

use crate::domain::entities::{FIRST_PAGE, GalleryItem, PollState};
use crate::domain::ports::{PAGE_SIZE, PhotoSourcePort, fetch_page};

/// A page load handed out by [`GalleryPager`], to be completed later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Page to fetch.
    pub page: u32,
    /// Query to fetch with, `None` for recent photos.
    pub query: Option<String>,
    generation: u64,
}

/// Accumulated gallery listing for the current query.
///
/// The pager owns the current page explicitly; nothing else mutates it. The
/// page the listing starts at replaces it, later pages append. An empty page
/// is ambiguous (a failure or the end of the results) and is appended as
/// nothing.
#[derive(Debug)]
pub struct GalleryPager {
    query: Option<String>,
    /// Page the loaded listing starts at.
    start_page: u32,
    current_page: u32,
    items: Vec<GalleryItem>,
    in_flight: bool,
    generation: u64,
}

impl Default for GalleryPager {
    fn default() -> Self {
        Self::new()
    }
}

impl GalleryPager {
    /// Creates a pager for the recent photos feed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            query: None,
            start_page: FIRST_PAGE,
            current_page: FIRST_PAGE,
            items: Vec::new(),
            in_flight: false,
            generation: 0,
        }
    }

    /// Creates a pager for the stored query, starting from the first page.
    #[must_use]
    pub fn from_state(state: &PollState) -> Self {
        Self {
            query: state.effective_query().map(str::to_owned),
            ..Self::new()
        }
    }

    /// Active search query.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Last page requested.
    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Items loaded so far.
    #[must_use]
    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    /// Returns true while a page load is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Switches to a search; a blank query means the recent feed.
    pub fn submit_query(&mut self, query: &str) {
        let query = query.trim();
        self.query = (!query.is_empty()).then(|| query.to_string());
        self.reset();
        info!(query = ?self.query, "Search submitted");
    }

    /// Switches back to the recent photos feed.
    pub fn clear_query(&mut self) {
        self.query = None;
        self.reset();
        info!("Search cleared");
    }

    /// Jumps to `page` of the current query; pages below the first clamp to it.
    /// The loaded listing is dropped and restarts at `page`.
    pub fn go_to_page(&mut self, page: u32) {
        self.reset();
        self.items.clear();
        self.start_page = page.max(FIRST_PAGE);
        self.current_page = self.start_page;
    }

    fn reset(&mut self) {
        self.start_page = FIRST_PAGE;
        self.current_page = FIRST_PAGE;
        self.in_flight = false;
        self.generation += 1;
    }

    /// Returns true when the last visible position reached the end of the
    /// loaded pages and no load is outstanding.
    #[must_use]
    pub fn should_load_next(&self, last_visible_index: usize) -> bool {
        let loaded_pages = (self.current_page - self.start_page + 1) as usize;
        let loaded_end = loaded_pages * PAGE_SIZE as usize;
        !self.in_flight && last_visible_index + 1 >= loaded_end
    }

    /// Starts reloading the current page.
    pub fn begin_reload(&mut self) -> PageRequest {
        self.in_flight = true;
        PageRequest {
            page: self.current_page,
            query: self.query.clone(),
            generation: self.generation,
        }
    }

    /// Advances to the next page and starts loading it.
    pub fn begin_next_page(&mut self) -> PageRequest {
        self.current_page += 1;
        debug!(page = self.current_page, "Fetching a new page");
        self.begin_reload()
    }

    /// Applies a finished load. Results for a superseded query are ignored.
    /// Returns the number of items now listed.
    pub fn complete(&mut self, request: &PageRequest, items: Vec<GalleryItem>) -> usize {
        if request.generation != self.generation {
            debug!(page = request.page, "Ignoring page for a superseded query");
            return self.items.len();
        }
        self.in_flight = false;

        let before = self.items.len();
        if request.page > self.start_page {
            self.items.extend(items);
        } else {
            self.items = items;
        }
        debug!(before, after = self.items.len(), page = request.page, "Updated gallery items");
        self.items.len()
    }

    /// Loads the current page.
    pub async fn reload(&mut self, source: &dyn PhotoSourcePort) -> usize {
        let request = self.begin_reload();
        let items = fetch_page(source, request.query.as_deref(), request.page).await;
        self.complete(&request, items)
    }

    /// Loads the page after the current one.
    pub async fn load_next(&mut self, source: &dyn PhotoSourcePort) -> usize {
        let request = self.begin_next_page();
        let items = fetch_page(source, request.query.as_deref(), request.page).await;
        self.complete(&request, items)
    }

    /// Writes the query and current page into persisted state.
    pub fn write_to(&self, state: &mut PollState) {
        state.stored_query.clone_from(&self.query);
        state.current_page = self.current_page;
    }
}
