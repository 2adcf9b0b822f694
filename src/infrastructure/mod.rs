//! Infrastructure layer with external service adapters.

/// Client configuration.
pub mod config;
/// HTTP transport.
pub mod http;
/// Image caching, processing, download and upload.
pub mod image;

pub use config::{AvatarConfig, CliArgs, ClientConfig, Command, LogLevel, StorageManager};
pub use http::ReqwestHttpClient;
pub use image::{
    CacheStats, DefaultImageProcessor, ImageDownloadService, ImageUploadService,
    InMemoryImageCache, ResizingImageProcessor,
};
