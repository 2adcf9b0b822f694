//! Avatar download coordinator.
//!
//! Collapses concurrent downloads of the same URL into one network request,
//! serves ready images from the injected cache, and delivers one shared
//! outcome to every caller waiting on a download.

use std::sync::Arc;

use reqwest::Url;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::domain::entities::{
    CacheKey, ImageDownloadOptions, ImageDownloadResult, ProcessingMethod,
};
use crate::domain::errors::{ImageFetchingError, ResponseErrorReason};
use crate::domain::ports::{
    CacheEntry, Claim, ClaimPolicy, FetchHandle, FetchOutcome, HttpClient, HttpRequest,
    ImageCaching,
};

use super::processor::process_image;

/// Downloads avatar images through a shared cache.
#[derive(Clone)]
pub struct ImageDownloadService {
    client: Arc<dyn HttpClient>,
    cache: Arc<dyn ImageCaching>,
}

impl std::fmt::Debug for ImageDownloadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageDownloadService").finish_non_exhaustive()
    }
}

impl ImageDownloadService {
    /// Creates a service over an injected transport and cache.
    #[must_use]
    pub fn new(client: Arc<dyn HttpClient>, cache: Arc<dyn ImageCaching>) -> Self {
        Self { client, cache }
    }

    /// Parses `url` and fetches it.
    ///
    /// # Errors
    /// Returns `InvalidUrl` if `url` does not parse, otherwise as
    /// [`fetch_image`](Self::fetch_image).
    pub async fn fetch_image_str(
        &self,
        url: &str,
        options: &ImageDownloadOptions,
    ) -> Result<ImageDownloadResult, ImageFetchingError> {
        let url = Url::parse(url).map_err(|_| ImageFetchingError::InvalidUrl)?;
        self.fetch_image(&url, options).await
    }

    /// Fetches the image at `url`.
    ///
    /// A ready cache entry is returned without touching the network unless
    /// `force_refresh` is set. A download already in flight for the same URL
    /// is joined, force refresh or not.
    ///
    /// # Errors
    /// Returns `ResponseError` on transport failures or non-2xx statuses and
    /// `ImageProcessorFailed` when the bytes cannot be processed. Callers
    /// joined to the same download receive the same error.
    pub async fn fetch_image(
        &self,
        url: &Url,
        options: &ImageDownloadOptions,
    ) -> Result<ImageDownloadResult, ImageFetchingError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ImageFetchingError::InvalidUrl);
        }

        let key = CacheKey::from_url(url);

        if !options.force_refresh {
            match self.cache.get(&key) {
                Some(CacheEntry::Ready(cached)) => {
                    debug!(key = %key, "Serving image from cache");
                    return Ok(ImageDownloadResult {
                        image: cached.image,
                        source_url: url.clone(),
                    });
                }
                Some(CacheEntry::InProgress(handle)) => {
                    debug!(key = %key, "Joining download in flight");
                    return handle.wait().await;
                }
                None => {}
            }
        }

        let policy = if options.force_refresh {
            ClaimPolicy::ReplaceReady
        } else {
            ClaimPolicy::KeepReady
        };

        let (tx, handle) = FetchHandle::pair();
        match self.cache.set_in_progress(&key, handle.clone(), policy) {
            Ok(Claim::Acquired) => {}
            Ok(Claim::InFlight(existing)) => {
                debug!(key = %key, "Joining download in flight");
                return existing.wait().await;
            }
            Ok(Claim::Ready(cached)) => {
                debug!(key = %key, "Serving image cached while claiming");
                return Ok(ImageDownloadResult {
                    image: cached.image,
                    source_url: url.clone(),
                });
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache unavailable, downloading without it");
                return download(self.client.as_ref(), url, &options.processing_method).await;
            }
        }

        let task = FetchTask {
            client: self.client.clone(),
            claim: ClaimGuard {
                cache: self.cache.clone(),
                key,
                settled: false,
            },
            url: url.clone(),
            processing_method: options.processing_method.clone(),
        };
        tokio::spawn(task.run(tx));

        handle.wait().await
    }
}

/// One network download owning a cache claim.
///
/// Runs detached from the callers so that none of them can cancel it for
/// the others.
struct FetchTask {
    client: Arc<dyn HttpClient>,
    claim: ClaimGuard,
    url: Url,
    processing_method: ProcessingMethod,
}

/// Removes the in-progress entry if the task is dropped before settling it,
/// whether by a panic, a runtime shutdown or never being polled.
struct ClaimGuard {
    cache: Arc<dyn ImageCaching>,
    key: CacheKey,
    settled: bool,
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        if !self.settled {
            warn!(key = %self.key, "Download ended without a result, releasing claim");
            self.cache.remove(&self.key);
        }
    }
}

impl FetchTask {
    async fn run(mut self, tx: oneshot::Sender<FetchOutcome>) {
        let cache = self.claim.cache.clone();
        let key = self.claim.key.clone();

        debug!(key = %key, "Downloading image from network");

        let outcome =
            fetch_and_process(self.client.as_ref(), &self.url, &self.processing_method).await;

        let outcome = match outcome {
            Ok((result, data)) => {
                if let Err(e) = cache.set_ready(&key, result.image.clone(), data) {
                    warn!(key = %key, error = %e, "Failed to cache image");
                    cache.remove(&key);
                }
                debug!(key = %key, source = "network", "Image loaded successfully");
                Ok(result)
            }
            Err(e) => {
                cache.remove(&key);
                debug!(key = %key, error = %e, "Image download failed");
                Err(e)
            }
        };
        self.claim.settled = true;

        // Every waiter may already be gone.
        let _ = tx.send(outcome);
    }
}

async fn download(
    client: &dyn HttpClient,
    url: &Url,
    processing_method: &ProcessingMethod,
) -> FetchOutcome {
    fetch_and_process(client, url, processing_method)
        .await
        .map(|(result, _)| result)
}

async fn fetch_and_process(
    client: &dyn HttpClient,
    url: &Url,
    processing_method: &ProcessingMethod,
) -> Result<(ImageDownloadResult, bytes::Bytes), ImageFetchingError> {
    let response = client
        .fetch_data(HttpRequest::get(url.clone()))
        .await
        .map_err(|e| ImageFetchingError::response(e.into()))?;

    if !response.is_success() {
        return Err(ImageFetchingError::response(ResponseErrorReason::status(
            response.status,
        )));
    }

    let data = response.body;
    let image = process_image(processing_method, data.clone()).await?;

    Ok((
        ImageDownloadResult {
            image,
            source_url: url.clone(),
        },
        data,
    ))
}
