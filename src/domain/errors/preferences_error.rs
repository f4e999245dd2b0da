//! Preference store error types.

use thiserror::Error;

/// Preference persistence error variants.
#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("preference store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to parse preferences: {0}")]
    Deserialize(#[from] toml::de::Error),
}
