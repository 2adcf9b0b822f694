//! Port definition for image caching.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tokio::sync::oneshot;

use crate::domain::entities::{CacheKey, CachedImage, ImageDownloadResult};
use crate::domain::errors::{ImageFetchingError, ResponseErrorReason};

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Terminal outcome of one download, shared by all of its waiters.
pub type FetchOutcome = Result<ImageDownloadResult, ImageFetchingError>;

/// Errors that can occur during cache operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// The backing store rejected the write.
    #[error("Cache write failed: {0}")]
    WriteFailed(String),
    /// The backing store is not reachable.
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// Handle to a download in flight.
///
/// Clones resolve to the same outcome. Dropping a clone, or never awaiting
/// it, has no effect on the download itself.
#[derive(Clone)]
pub struct FetchHandle {
    inner: Shared<BoxFuture<'static, FetchOutcome>>,
}

impl FetchHandle {
    /// Creates a handle resolved by whoever holds the matching sender.
    #[must_use]
    pub fn new(receiver: oneshot::Receiver<FetchOutcome>) -> Self {
        let inner = async move {
            receiver.await.unwrap_or_else(|_| {
                Err(ImageFetchingError::response(ResponseErrorReason::unexpected(
                    "download ended without a result",
                )))
            })
        }
        .boxed()
        .shared();
        Self { inner }
    }

    /// Creates a handle together with the sender that resolves it.
    #[must_use]
    pub fn pair() -> (oneshot::Sender<FetchOutcome>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self::new(rx))
    }

    /// Waits for the download to finish.
    pub async fn wait(self) -> FetchOutcome {
        self.inner.await
    }

    /// Returns true if both handles refer to the same download.
    #[must_use]
    pub fn same_fetch(&self, other: &Self) -> bool {
        self.inner.ptr_eq(&other.inner)
    }
}

impl fmt::Debug for FetchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchHandle").finish_non_exhaustive()
    }
}

/// State of a key in the cache.
#[derive(Debug, Clone)]
pub enum CacheEntry {
    /// A download is underway.
    InProgress(FetchHandle),
    /// The image is available.
    Ready(CachedImage),
}

/// Whether a claim may displace a ready image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimPolicy {
    /// A ready image is returned as [`Claim::Ready`] and left in place.
    KeepReady,
    /// A ready image is replaced by the in-progress marker.
    ReplaceReady,
}

/// Outcome of trying to mark a key as in progress.
#[derive(Debug, Clone)]
pub enum Claim {
    /// The caller's handle was stored; the caller must perform the download.
    Acquired,
    /// Another download already holds the key; join it instead.
    InFlight(FetchHandle),
    /// The image became ready before the claim; nothing to download.
    Ready(CachedImage),
}

/// Port for image caching operations.
///
/// Implementations must be thread-safe and may be shared by many download
/// services. Methods never block on I/O.
pub trait ImageCaching: Send + Sync {
    /// Returns the current entry for `key`.
    fn get(&self, key: &CacheKey) -> Option<CacheEntry>;

    /// Atomically marks `key` as in progress.
    ///
    /// If an `InProgress` entry already exists it is kept and returned as
    /// [`Claim::InFlight`]. A `Ready` entry is returned as [`Claim::Ready`]
    /// under [`ClaimPolicy::KeepReady`] and replaced under
    /// [`ClaimPolicy::ReplaceReady`]. Otherwise `handle` is stored.
    ///
    /// # Errors
    /// Returns error if the backing store cannot record the entry.
    fn set_in_progress(
        &self,
        key: &CacheKey,
        handle: FetchHandle,
        policy: ClaimPolicy,
    ) -> CacheResult<Claim>;

    /// Replaces the entry for `key` with a ready image.
    ///
    /// # Errors
    /// Returns error if the backing store cannot record the entry.
    fn set_ready(
        &self,
        key: &CacheKey,
        image: Arc<image::DynamicImage>,
        data: Bytes,
    ) -> CacheResult<()>;

    /// Removes any entry for `key`.
    fn remove(&self, key: &CacheKey);
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Kind of cache interaction.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum CacheMessageKind {
        Get,
        InProgress,
        Ready,
        Remove,
    }

    /// Mock cache recording every interaction.
    ///
    /// `InProgress` is only recorded when a claim is acquired.
    pub struct RecordingImageCache {
        entries: Mutex<HashMap<CacheKey, CacheEntry>>,
        messages: Mutex<Vec<(CacheMessageKind, CacheKey)>>,
        fail_writes: AtomicBool,
        fail_ready: AtomicBool,
    }

    impl RecordingImageCache {
        /// Creates empty mock cache.
        pub fn new() -> Self {
            Self {
                entries: Mutex::new(HashMap::new()),
                messages: Mutex::new(Vec::new()),
                fail_writes: AtomicBool::new(false),
                fail_ready: AtomicBool::new(false),
            }
        }

        /// Makes every write fail.
        pub fn set_fail_writes(&self, value: bool) {
            self.fail_writes.store(value, Ordering::SeqCst);
        }

        /// Makes only `set_ready` fail; claims still succeed.
        pub fn set_fail_ready(&self, value: bool) {
            self.fail_ready.store(value, Ordering::SeqCst);
        }

        /// Counts interactions of `kind` over all keys.
        pub fn message_count(&self, kind: CacheMessageKind) -> usize {
            self.messages.lock().iter().filter(|(k, _)| *k == kind).count()
        }

        /// Counts interactions of `kind` for `key`.
        pub fn message_count_for(&self, kind: CacheMessageKind, key: &str) -> usize {
            self.messages
                .lock()
                .iter()
                .filter(|(k, cache_key)| *k == kind && cache_key.as_str() == key)
                .count()
        }

        /// Returns the entry without recording a read.
        pub fn peek(&self, key: &str) -> Option<CacheEntry> {
            self.entries.lock().get(&CacheKey::new(key)).cloned()
        }

        fn record(&self, kind: CacheMessageKind, key: &CacheKey) {
            self.messages.lock().push((kind, key.clone()));
        }
    }

    impl Default for RecordingImageCache {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ImageCaching for RecordingImageCache {
        fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
            self.record(CacheMessageKind::Get, key);
            self.entries.lock().get(key).cloned()
        }

        fn set_in_progress(
            &self,
            key: &CacheKey,
            handle: FetchHandle,
            policy: ClaimPolicy,
        ) -> CacheResult<Claim> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(CacheError::Unavailable("mock failure".to_string()));
            }
            let mut entries = self.entries.lock();
            match entries.get(key) {
                Some(CacheEntry::InProgress(existing)) => {
                    return Ok(Claim::InFlight(existing.clone()));
                }
                Some(CacheEntry::Ready(cached)) if policy == ClaimPolicy::KeepReady => {
                    return Ok(Claim::Ready(cached.clone()));
                }
                _ => {}
            }
            entries.insert(key.clone(), CacheEntry::InProgress(handle));
            drop(entries);
            self.record(CacheMessageKind::InProgress, key);
            Ok(Claim::Acquired)
        }

        fn set_ready(
            &self,
            key: &CacheKey,
            image: Arc<image::DynamicImage>,
            data: Bytes,
        ) -> CacheResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) || self.fail_ready.load(Ordering::SeqCst) {
                return Err(CacheError::WriteFailed("mock failure".to_string()));
            }
            self.entries
                .lock()
                .insert(key.clone(), CacheEntry::Ready(CachedImage { image, data }));
            self.record(CacheMessageKind::Ready, key);
            Ok(())
        }

        fn remove(&self, key: &CacheKey) {
            self.entries.lock().remove(key);
            self.record(CacheMessageKind::Remove, key);
        }
    }
}
