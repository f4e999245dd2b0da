mod connectivity_port;
mod image_fetch_port;
mod notification_port;
mod photo_source_port;
mod preferences_port;

pub use connectivity_port::ConnectivityPort;
pub use image_fetch_port::ImageFetchPort;
pub use notification_port::NotificationPort;
pub use photo_source_port::{PAGE_SIZE, PhotoSourcePort, fetch_page};
pub use preferences_port::PreferencesPort;
