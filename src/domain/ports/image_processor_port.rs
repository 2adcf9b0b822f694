//! Port definition for turning downloaded bytes into images.

/// Converts raw downloaded bytes into a decoded image.
///
/// Runs on the blocking thread pool; implementations may be CPU heavy.
pub trait ImageProcessor: Send + Sync {
    /// Returns the processed image, or `None` if the bytes are rejected.
    fn process(&self, data: &[u8]) -> Option<image::DynamicImage>;
}
