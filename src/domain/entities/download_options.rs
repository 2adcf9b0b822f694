//! Options controlling a single avatar download.

use std::fmt;
use std::sync::Arc;

use super::avatar_url::AvatarQueryOptions;
use crate::domain::ports::ImageProcessor;

/// How downloaded bytes become an image.
#[derive(Clone, Default)]
pub enum ProcessingMethod {
    /// Decode with the built-in decoder.
    #[default]
    Common,
    /// Decode with a caller-supplied processor.
    Custom(Arc<dyn ImageProcessor>),
}

impl ProcessingMethod {
    /// Wraps a custom processor.
    #[must_use]
    pub fn custom(processor: impl ImageProcessor + 'static) -> Self {
        Self::Custom(Arc::new(processor))
    }
}

impl fmt::Debug for ProcessingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Common => write!(f, "Common"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Immutable options for one download.
#[derive(Debug, Clone)]
pub struct ImageDownloadOptions {
    /// Skip reading a ready cache entry. Concurrent downloads of the same
    /// key are still collapsed.
    pub force_refresh: bool,
    /// Processing applied to the downloaded bytes.
    pub processing_method: ProcessingMethod,
    /// Query options used when the URL is built from an identifier.
    pub avatar_query: AvatarQueryOptions,
}

impl ImageDownloadOptions {
    /// Options with the service's default avatar query (`d=404&s=240&r=g`).
    #[must_use]
    pub fn new() -> Self {
        Self {
            force_refresh: false,
            processing_method: ProcessingMethod::Common,
            avatar_query: AvatarQueryOptions::service_defaults(),
        }
    }

    /// Sets force refresh.
    #[must_use]
    pub const fn with_force_refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }

    /// Sets the processing method.
    #[must_use]
    pub fn with_processing_method(mut self, method: ProcessingMethod) -> Self {
        self.processing_method = method;
        self
    }

    /// Sets the avatar query options.
    #[must_use]
    pub fn with_avatar_query(mut self, query: AvatarQueryOptions) -> Self {
        self.avatar_query = query;
        self
    }
}

impl Default for ImageDownloadOptions {
    fn default() -> Self {
        Self::new()
    }
}
