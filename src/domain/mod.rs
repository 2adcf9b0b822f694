//! Domain layer with core entities, errors and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{
    AccountIdentifier, AvatarIdentifier, AvatarUrl, Email, HashId, ImageDownloadOptions,
    ImageDownloadResult,
};
pub use errors::{ImageFetchingError, ImageUploadError, ResponseErrorReason};
pub use ports::{HttpClient, ImageCaching, ImageProcessor};
