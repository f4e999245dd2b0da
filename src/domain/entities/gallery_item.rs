//! Gallery item entity.

use serde::{Deserialize, Serialize};

/// A single photo as listed by the remote photo service.
///
/// Items are immutable once parsed. Records without a thumbnail URL are
/// dropped by the parser, so items reaching the thumbnail pipeline always
/// carry one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GalleryItem {
    id: String,
    caption: String,
    thumbnail_url: Option<String>,
}

impl GalleryItem {
    /// Creates a new gallery item.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        caption: impl Into<String>,
        thumbnail_url: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            caption: caption.into(),
            thumbnail_url,
        }
    }

    /// Remote identifier of the photo.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Title of the photo, possibly empty.
    #[must_use]
    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Small-size image URL.
    #[must_use]
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }
}

impl std::fmt::Display for GalleryItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.caption.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{} ({})", self.caption, self.id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_caption() {
        let item = GalleryItem::new("42", "", None);
        assert_eq!(item.to_string(), "42");
    }

    #[test]
    fn test_display_with_caption() {
        let item = GalleryItem::new("42", "Sunset", Some("https://x/y.jpg".to_string()));
        assert_eq!(item.to_string(), "Sunset (42)");
        assert_eq!(item.thumbnail_url(), Some("https://x/y.jpg"));
    }
}
