//! In-memory LRU thumbnail cache bounded by decoded byte size.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use image::DynamicImage;
use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};

/// Share of the memory budget given to the cache by default.
pub const DEFAULT_MEMORY_FRACTION: f64 = 0.10;

/// Size of an image's decoded pixel data in bytes.
#[must_use]
pub fn decoded_size(image: &DynamicImage) -> usize {
    image.as_bytes().len()
}

struct CacheEntry {
    image: Arc<DynamicImage>,
    byte_size: usize,
}

struct CacheInner {
    entries: LruCache<String, CacheEntry>,
    total_bytes: usize,
}

/// Thread-safe LRU cache mapping image URLs to decoded thumbnails.
///
/// The capacity is a soft global bound checked after every insert: entries
/// are evicted least-recently-used first until the total fits. An entry larger
/// than the whole capacity is still stored, alone.
pub struct ImageCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl ImageCache {
    /// Creates a cache holding at most `capacity_bytes` of decoded pixels.
    #[must_use]
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: LruCache::unbounded(),
                total_bytes: 0,
            }),
            capacity: capacity_bytes,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Creates a cache sized as `fraction` of a process memory budget.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn from_memory_budget(budget_bytes: u64, fraction: f64) -> Self {
        let fraction = fraction.clamp(0.0, 1.0);
        let capacity = (budget_bytes as f64 * fraction) as usize;
        debug!(budget_bytes, fraction, capacity, "Sizing thumbnail cache");
        Self::new(capacity)
    }

    /// Configured capacity in bytes.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Looks up an image, marking it most recently used.
    pub fn get(&self, url: &str) -> Option<Arc<DynamicImage>> {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.entries.get(url) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(url, "Thumbnail cache hit");
            Some(entry.image.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(url, "Thumbnail cache miss");
            None
        }
    }

    /// Looks up an image without touching its recency.
    pub fn peek(&self, url: &str) -> Option<Arc<DynamicImage>> {
        self.inner.lock().entries.peek(url).map(|e| e.image.clone())
    }

    /// Returns true if the URL is cached, without touching its recency.
    pub fn contains(&self, url: &str) -> bool {
        self.inner.lock().entries.contains(url)
    }

    /// Stores an image and evicts least-recently-used entries over capacity.
    pub fn put(&self, url: impl Into<String>, image: Arc<DynamicImage>) {
        let url = url.into();
        let byte_size = decoded_size(&image);

        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        if let Some(old) = inner
            .entries
            .put(url.clone(), CacheEntry { image, byte_size })
        {
            inner.total_bytes -= old.byte_size;
        }
        inner.total_bytes += byte_size;
        trace!(url = %url, byte_size, total = inner.total_bytes, "Stored thumbnail");

        while inner.total_bytes > self.capacity && inner.entries.len() > 1 {
            let Some((evicted, entry)) = inner.entries.pop_lru() else {
                break;
            };
            inner.total_bytes -= entry.byte_size;
            self.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(url = %evicted, byte_size = entry.byte_size, "Evicted thumbnail");
        }
    }

    /// Number of cached images.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of decoded sizes of all cached images.
    pub fn total_bytes(&self) -> usize {
        self.inner.lock().total_bytes
    }

    /// Drops every cached image.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.total_bytes = 0;
        debug!("Cleared thumbnail cache");
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        let inner = self.inner.lock();
        CacheStats {
            hits,
            misses,
            evictions: self.evictions.load(Ordering::Relaxed),
            hit_rate,
            size: inner.entries.len(),
            bytes: inner.total_bytes,
            capacity: self.capacity,
        }
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries evicted to stay under capacity.
    pub evictions: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached images.
    pub size: usize,
    /// Current decoded size in bytes.
    pub bytes: usize,
    /// Capacity in bytes.
    pub capacity: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} images, {}/{} bytes, {:.1}% hit rate ({} hits, {} misses, {} evicted)",
            self.size,
            self.bytes,
            self.capacity,
            self.hit_rate,
            self.hits,
            self.misses,
            self.evictions
        )
    }
}
