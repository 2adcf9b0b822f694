//! Image handling infrastructure.
//!
//! This module provides:
//! - In-memory caching of ready images and downloads in flight
//! - Built-in image processors
//! - The de-duplicating download coordinator
//! - Avatar uploads

pub mod downloader;
pub mod memory_cache;
pub mod processor;
pub mod uploader;

pub use downloader::ImageDownloadService;
pub use memory_cache::{CacheStats, InMemoryImageCache};
pub use processor::{DefaultImageProcessor, ResizingImageProcessor, process_image};
pub use uploader::{DEFAULT_UPLOAD_URL, ImageUploadService, image_upload_body};
