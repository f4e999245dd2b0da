use crate::domain::entities::NewContentEvent;

/// Port for presenting "new content available" events.
pub trait NotificationPort: Send + Sync {
    /// Presents the event to the user.
    fn publish(&self, event: &NewContentEvent);
}
