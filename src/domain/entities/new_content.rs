//! Event raised when polling finds new photos.

use chrono::{DateTime, Utc};

/// Raised by the poll coordinator when the newest result id changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContentEvent {
    /// Id of the newest result.
    pub result_id: String,
    /// Id that was previously the newest, if any.
    pub previous_id: Option<String>,
    /// Search query the poll ran with.
    pub query: Option<String>,
    /// When the change was detected.
    pub detected_at: DateTime<Utc>,
}

impl NewContentEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(
        result_id: impl Into<String>,
        previous_id: Option<String>,
        query: Option<String>,
    ) -> Self {
        Self {
            result_id: result_id.into(),
            previous_id,
            query,
            detected_at: Utc::now(),
        }
    }

    /// Short human-readable title.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        "New pictures"
    }

    /// Body text for presentation.
    #[must_use]
    pub fn body(&self) -> String {
        match &self.query {
            Some(query) => format!("New results for \"{query}\""),
            None => "You have new pictures in PhotoGallery.".to_string(),
        }
    }
}
