//! Application layer with pagination, polling, and notification policy.

/// Application services.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use services::{
    ForegroundAwareNotifier, GalleryPager, PollScheduler, PollingController, VisibilityHandle,
};
pub use use_cases::{PollCoordinator, PollOutcome};
