//! PhotoGallery - browse a remote photo feed and watch it for new pictures.
//!
//! This crate provides a paged photo listing client, a lazily populated
//! thumbnail pipeline with a byte-bounded cache, and background polling
//! that raises a notification when the newest result changes.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing use cases and services.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;
/// Presentation layer containing slot bookkeeping and the CLI front end.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "photogallery";
