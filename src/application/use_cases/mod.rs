//! Use case implementations.

mod poll_coordinator;

pub use poll_coordinator::{PollCoordinator, PollOutcome};
