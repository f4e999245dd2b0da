//! Suppression of background notifications while the gallery is on screen.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::domain::entities::NewContentEvent;
use crate::domain::ports::NotificationPort;

/// Shared flag the UI flips while the gallery is visible.
#[derive(Debug, Clone, Default)]
pub struct VisibilityHandle(Arc<AtomicBool>);

impl VisibilityHandle {
    /// Creates a handle in the hidden state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the gallery visible or hidden.
    pub fn set_visible(&self, visible: bool) {
        self.0.store(visible, Ordering::SeqCst);
    }

    /// Returns true while the gallery is visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Forwards events to another notifier unless the gallery is visible.
pub struct ForegroundAwareNotifier {
    inner: Arc<dyn NotificationPort>,
    visibility: VisibilityHandle,
}

impl ForegroundAwareNotifier {
    /// Wraps `inner`, consulting `visibility` on every event.
    #[must_use]
    pub const fn new(inner: Arc<dyn NotificationPort>, visibility: VisibilityHandle) -> Self {
        Self { inner, visibility }
    }
}

impl NotificationPort for ForegroundAwareNotifier {
    fn publish(&self, event: &NewContentEvent) {
        if self.visibility.is_visible() {
            debug!(result_id = %event.result_id, "Gallery visible, notification suppressed");
            return;
        }
        self.inner.publish(event);
    }
}
