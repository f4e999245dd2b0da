//! Preference store port definition.

use async_trait::async_trait;

use crate::domain::entities::Preferences;
use crate::domain::errors::PreferencesError;

/// Port for reading and writing persisted preferences.
#[async_trait]
pub trait PreferencesPort: Send + Sync {
    /// Loads stored preferences, or defaults when nothing is stored.
    async fn load(&self) -> Result<Preferences, PreferencesError>;

    /// Replaces stored preferences.
    async fn save(&self, preferences: &Preferences) -> Result<(), PreferencesError>;

    /// Stores the newest seen result id, leaving every other preference as
    /// it currently is in the store.
    async fn record_last_result_id(&self, result_id: &str) -> Result<(), PreferencesError> {
        let mut preferences = self.load().await?;
        preferences.poll.last_result_id = Some(result_id.to_string());
        self.save(&preferences).await
    }
}

#[cfg(test)]
#[allow(dead_code)]
pub mod mock {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::RwLock;

    /// In-memory preference store for testing.
    #[derive(Default)]
    pub struct InMemoryPreferences {
        preferences: Arc<RwLock<Preferences>>,
        saves: AtomicUsize,
    }

    impl InMemoryPreferences {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_preferences(preferences: Preferences) -> Self {
            Self {
                preferences: Arc::new(RwLock::new(preferences)),
                saves: AtomicUsize::new(0),
            }
        }

        pub async fn snapshot(&self) -> Preferences {
            self.preferences.read().await.clone()
        }

        pub fn save_count(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PreferencesPort for InMemoryPreferences {
        async fn load(&self) -> Result<Preferences, PreferencesError> {
            Ok(self.preferences.read().await.clone())
        }

        async fn save(&self, preferences: &Preferences) -> Result<(), PreferencesError> {
            *self.preferences.write().await = preferences.clone();
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn record_last_result_id(&self, result_id: &str) -> Result<(), PreferencesError> {
            self.preferences.write().await.poll.last_result_id = Some(result_id.to_string());
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
