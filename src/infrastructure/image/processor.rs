//! Built-in image processors.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{trace, warn};

use crate::domain::entities::ProcessingMethod;
use crate::domain::errors::ImageFetchingError;
use crate::domain::ports::ImageProcessor;

/// Decodes any supported format as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultImageProcessor;

impl ImageProcessor for DefaultImageProcessor {
    fn process(&self, data: &[u8]) -> Option<image::DynamicImage> {
        match image::load_from_memory(data) {
            Ok(img) => Some(img),
            Err(e) => {
                trace!(error = %e, "Failed to decode image");
                None
            }
        }
    }
}

/// Decodes, then downscales images whose longest edge exceeds `max_edge`.
#[derive(Debug, Clone, Copy)]
pub struct ResizingImageProcessor {
    max_edge: u32,
}

impl ResizingImageProcessor {
    /// Creates a processor limiting the longest edge to `max_edge` pixels.
    #[must_use]
    pub const fn new(max_edge: u32) -> Self {
        Self { max_edge }
    }
}

impl ImageProcessor for ResizingImageProcessor {
    fn process(&self, data: &[u8]) -> Option<image::DynamicImage> {
        let img = DefaultImageProcessor.process(data)?;
        if img.width().max(img.height()) > self.max_edge {
            Some(img.resize(
                self.max_edge,
                self.max_edge,
                image::imageops::FilterType::Lanczos3,
            ))
        } else {
            Some(img)
        }
    }
}

/// Runs `method` over `data` on the blocking pool.
///
/// # Errors
/// Returns `ImageProcessorFailed` if the processor rejects the bytes or panics.
pub async fn process_image(
    method: &ProcessingMethod,
    data: Bytes,
) -> Result<Arc<image::DynamicImage>, ImageFetchingError> {
    let processor: Arc<dyn ImageProcessor> = match method {
        ProcessingMethod::Common => Arc::new(DefaultImageProcessor),
        ProcessingMethod::Custom(processor) => processor.clone(),
    };

    let decoded = tokio::task::spawn_blocking(move || processor.process(&data))
        .await
        .map_err(|e| {
            warn!(error = %e, "Image processing task panicked");
            ImageFetchingError::ImageProcessorFailed
        })?;

    decoded
        .map(Arc::new)
        .ok_or(ImageFetchingError::ImageProcessorFailed)
}


#[cfg(test)]
mod tests {
    use super::test_support::png_bytes;
    use super::*;
    use crate::domain::ports::mocks::FailingImageProcessor;

    #[tokio::test]
    async fn test_common_decodes_png() {
        let img = process_image(&ProcessingMethod::Common, Bytes::from(png_bytes(8, 4)))
            .await
            .expect("decodable png");
        assert_eq!((img.width(), img.height()), (8, 4));
    }

    #[tokio::test]
    async fn test_common_rejects_garbage() {
        let result =
            process_image(&ProcessingMethod::Common, Bytes::from_static(b"not an image")).await;
        assert_eq!(result.err(), Some(ImageFetchingError::ImageProcessorFailed));
    }

    #[tokio::test]
    async fn test_custom_processor_failure() {
        let method = ProcessingMethod::custom(FailingImageProcessor);
        let result = process_image(&method, Bytes::from(png_bytes(8, 8))).await;
        assert_eq!(result.err(), Some(ImageFetchingError::ImageProcessorFailed));
    }

    #[test]
    fn test_resizing_processor_limits_longest_edge() {
        let processor = ResizingImageProcessor::new(50);
        let img = processor.process(&png_bytes(200, 100)).expect("decodable png");
        assert_eq!((img.width(), img.height()), (50, 25));

        let small = processor.process(&png_bytes(20, 10)).expect("decodable png");
        assert_eq!((small.width(), small.height()), (20, 10));
    }
}
