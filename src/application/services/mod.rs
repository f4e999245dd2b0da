//! Application services.

mod gallery_pager;
mod notification_gate;
mod poll_scheduler;

pub use gallery_pager::{GalleryPager, PageRequest};
pub use notification_gate::{ForegroundAwareNotifier, VisibilityHandle};
pub use poll_scheduler::{
    DEFAULT_CYCLE_TIMEOUT, DEFAULT_POLL_INTERVAL, PollScheduler, PollingController,
};
