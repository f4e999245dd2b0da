//! Domain layer with core entities, errors, and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{GalleryItem, NewContentEvent, PollState, Preferences};
pub use errors::{FetchError, PreferencesError};
pub use ports::{
    ConnectivityPort, ImageFetchPort, NotificationPort, PAGE_SIZE, PhotoSourcePort,
    PreferencesPort,
};
