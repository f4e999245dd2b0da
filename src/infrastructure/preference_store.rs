//! TOML-backed preference persistence.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use crate::domain::entities::Preferences;
use crate::domain::errors::PreferencesError;
use crate::domain::ports::PreferencesPort;

/// Stores [`Preferences`] in a single TOML file.
///
/// A missing file reads as defaults. A malformed file also reads as defaults,
/// with a warning, and is replaced on the next save.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PreferencesPort for PreferenceStore {
    async fn load(&self) -> Result<Preferences, PreferencesError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?self.path, "No stored preferences, using defaults");
                return Ok(Preferences::default());
            }
            Err(e) => return Err(e.into()),
        };

        match toml::from_str(&content) {
            Ok(preferences) => Ok(preferences),
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Failed to parse preferences, using defaults");
                Ok(Preferences::default())
            }
        }
    }

    async fn save(&self, preferences: &Preferences) -> Result<(), PreferencesError> {
        let content = toml::to_string_pretty(preferences)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || -> Result<(), PreferencesError> {
            let parent = path
                .parent()
                .ok_or_else(|| std::io::Error::other("preferences path has no parent"))?;
            std::fs::create_dir_all(parent)?;

            let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
            temp_file.write_all(content.as_bytes())?;
            temp_file.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(std::io::Error::other)??;

        debug!(path = ?self.path, "Stored preferences");
        Ok(())
    }
}
