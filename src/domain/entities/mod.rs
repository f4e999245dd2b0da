//! Domain entity definitions.

mod gallery_item;
mod new_content;
mod poll_state;

pub use gallery_item::GalleryItem;
pub use new_content::NewContentEvent;
pub use poll_state::{FIRST_PAGE, PollState, Preferences};
