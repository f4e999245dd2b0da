//! Periodic execution of poll cycles and the persisted polling toggle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tracing::{debug, info, warn};

use crate::application::use_cases::{PollCoordinator, PollOutcome};
use crate::domain::errors::PreferencesError;
use crate::domain::ports::PreferencesPort;

/// Time between poll cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
/// Longest a single cycle may run before it is abandoned.
pub const DEFAULT_CYCLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs [`PollCoordinator::run_cycle`] on a fixed interval.
///
/// The first cycle runs immediately. Cycles never overlap: a slow cycle delays
/// the next tick instead of queueing a burst.
pub struct PollScheduler {
    interval: Duration,
    cycle_timeout: Duration,
    running: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PollScheduler {
    #[must_use]
    pub fn new(interval: Duration, cycle_timeout: Duration) -> Self {
        Self {
            interval,
            cycle_timeout,
            running: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
        }
    }

    /// Starts the poll loop. Does nothing if it is already running.
    pub fn start(&self, coordinator: Arc<PollCoordinator>) {
        let mut handle = self.handle.lock();
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("Poll scheduler already running");
            return;
        }

        let period = self.interval;
        let cycle_timeout = self.cycle_timeout;
        let running = self.running.clone();

        info!(interval_secs = period.as_secs(), "Starting poll scheduler");
        *handle = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            while running.load(Ordering::SeqCst) {
                ticker.tick().await;

                match timeout(cycle_timeout, coordinator.run_cycle()).await {
                    Ok(PollOutcome::NewContent(event)) => {
                        debug!(result_id = %event.result_id, "Poll cycle found new content");
                    }
                    Ok(outcome) => debug!(?outcome, "Poll cycle finished"),
                    Err(_) => warn!(
                        timeout_secs = cycle_timeout.as_secs(),
                        "Poll cycle timed out and was abandoned"
                    ),
                }
            }

            debug!("Poll loop stopped");
        }));
    }

    /// Stops the poll loop, abandoning any cycle in progress.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
            info!("Stopped poll scheduler");
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for PollScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_CYCLE_TIMEOUT)
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// User-facing polling switch, persisted across restarts.
pub struct PollingController {
    scheduler: PollScheduler,
    coordinator: Arc<PollCoordinator>,
    preferences: Arc<dyn PreferencesPort>,
}

impl PollingController {
    #[must_use]
    pub fn new(
        scheduler: PollScheduler,
        coordinator: Arc<PollCoordinator>,
        preferences: Arc<dyn PreferencesPort>,
    ) -> Self {
        Self {
            scheduler,
            coordinator,
            preferences,
        }
    }

    /// Stores the polling flag, then starts or stops the scheduler to match.
    ///
    /// # Errors
    /// Returns error if the flag cannot be persisted; the scheduler is left
    /// untouched in that case.
    pub async fn set_enabled(&self, enabled: bool) -> Result<(), PreferencesError> {
        let mut preferences = self.preferences.load().await?;
        preferences.polling_enabled = enabled;
        self.preferences.save(&preferences).await?;

        if enabled {
            self.scheduler.start(self.coordinator.clone());
        } else {
            self.scheduler.stop();
        }
        Ok(())
    }

    /// Starts polling if it was enabled in a previous run.
    ///
    /// # Errors
    /// Returns error if preferences cannot be read.
    pub async fn restore(&self) -> Result<bool, PreferencesError> {
        let enabled = self.preferences.load().await?.polling_enabled;
        if enabled {
            info!("Restoring background polling");
            self.scheduler.start(self.coordinator.clone());
        }
        Ok(enabled)
    }

    /// Stops the scheduler for this process without touching the stored flag.
    pub fn stop(&self) {
        self.scheduler.stop();
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.scheduler.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{GalleryItem, Preferences};
    use crate::domain::ports::ConnectivityPort;
    use crate::domain::ports::mocks::{
        InMemoryPreferences, MockConnectivityPort, MockNotificationPort, MockPhotoSourcePort,
    };
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    fn coordinator(preferences: Arc<InMemoryPreferences>) -> Arc<PollCoordinator> {
        let mut source = MockPhotoSourcePort::new();
        source
            .expect_fetch_recent()
            .returning(|_| vec![GalleryItem::new("42", "", Some("u".to_string()))]);
        let mut connectivity = MockConnectivityPort::new();
        connectivity.expect_is_connected().return_const(true);

        Arc::new(PollCoordinator::new(
            Arc::new(source),
            preferences,
            Arc::new(connectivity),
            Arc::new(MockNotificationPort::new()),
        ))
    }

    /// Connectivity check that never answers.
    #[derive(Default)]
    struct StalledConnectivity {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ConnectivityPort for StalledConnectivity {
        async fn is_connected(&self) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_immediately_then_every_interval() {
        let preferences = Arc::new(InMemoryPreferences::new());
        let scheduler = PollScheduler::default();

        scheduler.start(coordinator(preferences.clone()));
        tokio::time::sleep(Duration::from_secs(125)).await;

        assert!(scheduler.is_running());
        assert_eq!(preferences.save_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_cycles() {
        let preferences = Arc::new(InMemoryPreferences::new());
        let scheduler = PollScheduler::default();

        scheduler.start(coordinator(preferences.clone()));
        tokio::time::sleep(Duration::from_secs(5)).await;
        scheduler.stop();
        tokio::time::sleep(Duration::from_secs(300)).await;

        assert!(!scheduler.is_running());
        assert_eq!(preferences.save_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_cycle_is_abandoned() {
        let connectivity = Arc::new(StalledConnectivity::default());
        let coordinator = Arc::new(PollCoordinator::new(
            Arc::new(MockPhotoSourcePort::new()),
            Arc::new(InMemoryPreferences::new()),
            connectivity.clone(),
            Arc::new(MockNotificationPort::new()),
        ));
        let scheduler = PollScheduler::new(Duration::from_secs(60), Duration::from_secs(5));

        scheduler.start(coordinator);
        tokio::time::sleep(Duration::from_secs(130)).await;

        assert_eq!(connectivity.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_persists_flag() {
        let preferences = Arc::new(InMemoryPreferences::new());
        let controller = PollingController::new(
            PollScheduler::default(),
            coordinator(preferences.clone()),
            preferences.clone(),
        );

        controller.set_enabled(true).await.unwrap();
        assert!(controller.is_active());
        assert!(preferences.snapshot().await.polling_enabled);

        controller.set_enabled(false).await.unwrap();
        assert!(!controller.is_active());
        assert!(!preferences.snapshot().await.polling_enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_follows_stored_flag() {
        let enabled = Arc::new(InMemoryPreferences::with_preferences(Preferences {
            polling_enabled: true,
            ..Preferences::default()
        }));
        let controller = PollingController::new(
            PollScheduler::default(),
            coordinator(enabled.clone()),
            enabled,
        );
        assert!(controller.restore().await.unwrap());
        assert!(controller.is_active());

        let disabled = Arc::new(InMemoryPreferences::new());
        let controller = PollingController::new(
            PollScheduler::default(),
            coordinator(disabled.clone()),
            disabled,
        );
        assert!(!controller.restore().await.unwrap());
        assert!(!controller.is_active());
    }
}
