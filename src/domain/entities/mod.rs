//! Domain entities.

mod account;
mod avatar_url;
mod download;
mod download_options;
mod identifier;

pub use account::{AccessToken, AccountIdentifier};
pub use avatar_url::{
    AvatarQueryOptions, AvatarUrl, DEFAULT_AVATAR_BASE_URL, DEFAULT_AVATAR_SIZE,
    DefaultAvatarOption, MAX_AVATAR_SIZE, Rating,
};
pub use download::{CacheKey, CachedImage, ImageDownloadResult};
pub use download_options::{ImageDownloadOptions, ProcessingMethod};
pub use identifier::{AvatarIdentifier, Email, HashId};
