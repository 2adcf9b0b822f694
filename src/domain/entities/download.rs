//! Domain types for downloaded avatar images.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::Url;

/// Identifies one fetchable image in a cache.
///
/// Derived from the full request URL, whose query already carries the
/// size, rating and default-image options.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Creates a key from any string-like input.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Creates the key for a request URL.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        Self(url.as_str().to_string())
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&Url> for CacheKey {
    fn from(url: &Url) -> Self {
        Self::from_url(url)
    }
}

/// A decoded image together with the bytes it was decoded from.
#[derive(Debug, Clone)]
pub struct CachedImage {
    /// The processed image.
    pub image: Arc<image::DynamicImage>,
    /// Raw downloaded bytes.
    pub data: Bytes,
}

/// Result of a successful avatar download.
#[derive(Debug, Clone)]
pub struct ImageDownloadResult {
    /// The processed image, shared by every caller of the same download.
    pub image: Arc<image::DynamicImage>,
    /// URL the image was requested from.
    pub source_url: Url,
}
