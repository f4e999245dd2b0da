//! Thumbnail pipeline.
//!
//! This module provides:
//! - Memory caching with byte-bounded LRU eviction
//! - A serial background worker that coalesces requests per slot

pub mod fetch_worker;
pub mod memory_cache;

pub use fetch_worker::{
    Dispatch, FetchWorker, FetchWorkerConfig, SlotKey, ThumbnailCompletion, ThumbnailListener,
};
pub use memory_cache::{CacheStats, DEFAULT_MEMORY_FRACTION, ImageCache, decoded_size};
