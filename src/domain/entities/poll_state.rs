//! Persisted polling and query state.

use serde::{Deserialize, Serialize};

/// First page of every result set.
pub const FIRST_PAGE: u32 = 1;

/// State round-tripped through the preference store once per poll cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollState {
    /// Id of the newest result seen by the last non-empty poll cycle.
    #[serde(default)]
    pub last_result_id: Option<String>,

    /// Page the gallery is currently showing.
    #[serde(default = "default_page")]
    pub current_page: u32,

    /// Search query, or `None` for the recent photos feed.
    #[serde(default)]
    pub stored_query: Option<String>,
}

impl PollState {
    /// Returns the stored query if it is not blank.
    #[must_use]
    pub fn effective_query(&self) -> Option<&str> {
        self.stored_query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// Returns the current page, never below the first page.
    #[must_use]
    pub fn effective_page(&self) -> u32 {
        self.current_page.max(FIRST_PAGE)
    }
}

impl Default for PollState {
    fn default() -> Self {
        Self {
            last_result_id: None,
            current_page: FIRST_PAGE,
            stored_query: None,
        }
    }
}

/// Everything the application persists between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Whether background polling should be running.
    #[serde(default)]
    pub polling_enabled: bool,

    /// Query and poll bookkeeping.
    #[serde(default)]
    pub poll: PollState,
}

const fn default_page() -> u32 {
    FIRST_PAGE
}
