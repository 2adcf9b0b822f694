//! In-memory image cache implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::domain::entities::{CacheKey, CachedImage};
use crate::domain::ports::{
    CacheEntry, CacheResult, Claim, ClaimPolicy, FetchHandle, ImageCaching,
};

/// In-memory cache for downloaded images and downloads in flight.
/// Thread-safe; entries are never evicted.
pub struct InMemoryImageCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InMemoryImageCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
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

        let entries = self.entries.lock();
        let in_progress = entries
            .values()
            .filter(|entry| matches!(entry, CacheEntry::InProgress(_)))
            .count();

        CacheStats {
            hits,
            misses,
            hit_rate,
            ready: entries.len() - in_progress,
            in_progress,
        }
    }

    /// Returns the number of entries, ready or in progress.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops ready images. Downloads in flight keep their entries so that
    /// callers still join them.
    pub fn clear(&self) {
        self.entries
            .lock()
            .retain(|_, entry| matches!(entry, CacheEntry::InProgress(_)));
        debug!("Cleared memory image cache");
    }
}

impl Default for InMemoryImageCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of reads that found an entry.
    pub hits: u64,
    /// Number of reads that found nothing.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of ready images.
    pub ready: usize,
    /// Current number of downloads in flight.
    pub in_progress: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} images, {} in flight, {:.1}% hit rate ({} hits, {} misses)",
            self.ready, self.in_progress, self.hit_rate, self.hits, self.misses
        )
    }
}

impl ImageCaching for InMemoryImageCache {
    fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let entry = self.entries.lock().get(key).cloned();
        if entry.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Memory cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Memory cache miss");
        }
        entry
    }

    fn set_in_progress(
        &self,
        key: &CacheKey,
        handle: FetchHandle,
        policy: ClaimPolicy,
    ) -> CacheResult<Claim> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(CacheEntry::InProgress(existing)) => {
                trace!(key = %key, "Download already in flight");
                return Ok(Claim::InFlight(existing.clone()));
            }
            Some(CacheEntry::Ready(cached)) if policy == ClaimPolicy::KeepReady => {
                trace!(key = %key, "Image became ready before the claim");
                return Ok(Claim::Ready(cached.clone()));
            }
            _ => {}
        }
        entries.insert(key.clone(), CacheEntry::InProgress(handle));
        trace!(key = %key, "Marked download in flight");
        Ok(Claim::Acquired)
    }

    fn set_ready(
        &self,
        key: &CacheKey,
        image: Arc<image::DynamicImage>,
        data: Bytes,
    ) -> CacheResult<()> {
        debug!(key = %key, bytes = data.len(), "Storing image in memory cache");
        self.entries
            .lock()
            .insert(key.clone(), CacheEntry::Ready(CachedImage { image, data }));
        Ok(())
    }

    fn remove(&self, key: &CacheKey) {
        if self.entries.lock().remove(key).is_some() {
            debug!(key = %key, "Removed image from memory cache");
        }
    }
}
