//! Desktop notifications for new pictures.

use notify_rust::Notification;

use crate::domain::entities::NewContentEvent;
use crate::domain::ports::NotificationPort;

const APP_NAME: &str = "PhotoGallery";

#[derive(Debug, Clone, Default)]
pub struct DesktopNotificationService {
    enabled: bool,
}

impl DesktopNotificationService {
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl NotificationPort for DesktopNotificationService {
    fn publish(&self, event: &NewContentEvent) {
        if !self.enabled {
            tracing::debug!(result_id = %event.result_id, "Desktop notifications disabled");
            return;
        }

        let title = event.title().to_string();
        let body = event.body();

        tokio::task::spawn_blocking(move || {
            if let Err(e) = Notification::new()
                .summary(&title)
                .body(&body)
                .appname(APP_NAME)
                .show()
            {
                tracing::warn!(error = %e, "Failed to show notification");
            }
        });
    }
}
