//! Background check for new photos.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::entities::NewContentEvent;
use crate::domain::ports::{
    ConnectivityPort, NotificationPort, PhotoSourcePort, PreferencesPort, fetch_page,
};

/// Result of one poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// No network; nothing was fetched or stored.
    Offline,
    /// Preferences could not be read; nothing was fetched.
    StateUnavailable,
    /// The listing came back empty (failure or end of results).
    NoResults,
    /// The newest result is the one seen last time.
    Unchanged {
        /// Id of the newest result.
        result_id: String,
    },
    /// The newest result changed and an event was published.
    NewContent(NewContentEvent),
}

/// Compares the newest listed photo against the last one seen.
///
/// Never fails: every error is logged and folded into an outcome, and the
/// next scheduled cycle simply tries again.
#[derive(Clone)]
pub struct PollCoordinator {
    source: Arc<dyn PhotoSourcePort>,
    preferences: Arc<dyn PreferencesPort>,
    connectivity: Arc<dyn ConnectivityPort>,
    notifier: Arc<dyn NotificationPort>,
}

impl PollCoordinator {
    /// Creates new poll coordinator.
    #[must_use]
    pub fn new(
        source: Arc<dyn PhotoSourcePort>,
        preferences: Arc<dyn PreferencesPort>,
        connectivity: Arc<dyn ConnectivityPort>,
        notifier: Arc<dyn NotificationPort>,
    ) -> Self {
        Self {
            source,
            preferences,
            connectivity,
            notifier,
        }
    }

    /// Runs one poll cycle.
    pub async fn run_cycle(&self) -> PollOutcome {
        if !self.connectivity.is_connected().await {
            debug!("No network connection, skipping poll");
            return PollOutcome::Offline;
        }

        let preferences = match self.preferences.load().await {
            Ok(preferences) => preferences,
            Err(e) => {
                warn!(error = %e, "Failed to read preferences, skipping poll");
                return PollOutcome::StateUnavailable;
            }
        };

        let query = preferences.poll.effective_query().map(str::to_owned);
        let page = preferences.poll.effective_page();
        let items = fetch_page(self.source.as_ref(), query.as_deref(), page).await;

        let Some(newest) = items.first() else {
            debug!(page, "Poll returned no results");
            return PollOutcome::NoResults;
        };
        let result_id = newest.id().to_string();
        let previous_id = preferences.poll.last_result_id;

        let outcome = if previous_id.as_deref() == Some(result_id.as_str()) {
            info!(result_id = %result_id, "Got an old result");
            PollOutcome::Unchanged {
                result_id: result_id.clone(),
            }
        } else {
            info!(result_id = %result_id, previous = ?previous_id, "Got a new result");
            let event = NewContentEvent::new(result_id.clone(), previous_id, query);
            self.notifier.publish(&event);
            PollOutcome::NewContent(event)
        };

        // Other preferences may have changed while the page was loading.
        if let Err(e) = self.preferences.record_last_result_id(&result_id).await {
            warn!(error = %e, "Failed to store last result id");
        }

        outcome
    }
}
