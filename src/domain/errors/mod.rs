//! Domain error types.

mod fetch_error;
mod preferences_error;

pub use fetch_error::FetchError;
pub use preferences_error::PreferencesError;
