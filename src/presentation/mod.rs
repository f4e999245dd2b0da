//! Presentation layer: slot bookkeeping and the command-line front end.

/// Command handlers and composition root.
pub mod app;
/// Slot-to-item registry for recycled display slots.
pub mod slot_binding;

pub use app::{App, thumbnail_file_name};
pub use slot_binding::{BoundSlot, SlotBinding, SlotContent};
