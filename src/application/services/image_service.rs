//! Avatar fetching and uploading by account identifier.

use std::sync::Arc;

use reqwest::Url;
use tracing::{debug, info, warn};

use crate::domain::entities::{
    AccountIdentifier, AvatarIdentifier, AvatarQueryOptions, AvatarUrl, ImageDownloadOptions,
    ImageDownloadResult,
};
use crate::domain::errors::{HttpClientError, ImageFetchingError, ImageUploadError};
use crate::domain::ports::{HttpClient, HttpResponse, ImageCaching};
use crate::infrastructure::config::ClientConfig;
use crate::infrastructure::http::ReqwestHttpClient;
use crate::infrastructure::image::{ImageDownloadService, ImageUploadService};

/// Entry point for avatar operations.
///
/// Cheap to clone; clones share the transport and cache.
#[derive(Debug, Clone)]
pub struct ImageService {
    downloader: ImageDownloadService,
    uploader: ImageUploadService,
    avatar_base: Option<Url>,
}

impl ImageService {
    /// Creates a service over an injected transport and cache, using the
    /// public Gravatar endpoints.
    #[must_use]
    pub fn new(client: Arc<dyn HttpClient>, cache: Arc<dyn ImageCaching>) -> Self {
        Self {
            downloader: ImageDownloadService::new(client.clone(), cache),
            uploader: ImageUploadService::new(client),
            avatar_base: None,
        }
    }

    /// Creates a service with a reqwest transport configured from `config`.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn from_config(
        config: &ClientConfig,
        cache: Arc<dyn ImageCaching>,
    ) -> Result<Self, HttpClientError> {
        let client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::with_settings(
            config.timeout(),
            &config.user_agent,
        )?);

        let avatar_base = match Url::parse(&config.avatar_base_url) {
            Ok(base) => Some(normalize_base(base)),
            Err(e) => {
                warn!(url = %config.avatar_base_url, error = %e, "Invalid avatar base URL, using default");
                None
            }
        };

        Ok(Self {
            downloader: ImageDownloadService::new(client.clone(), cache),
            uploader: ImageUploadService::with_upload_url(client, config.upload_url.clone()),
            avatar_base,
        })
    }

    /// Returns the underlying download coordinator.
    #[must_use]
    pub const fn downloader(&self) -> &ImageDownloadService {
        &self.downloader
    }

    /// Builds the avatar URL for `identifier`.
    ///
    /// # Errors
    /// Returns `InvalidUrl` if the identifier is empty.
    pub fn avatar_url(
        &self,
        identifier: &AvatarIdentifier,
        options: AvatarQueryOptions,
    ) -> Result<AvatarUrl, ImageFetchingError> {
        match &self.avatar_base {
            Some(base) => AvatarUrl::with_base(base, identifier, options),
            None => AvatarUrl::new(identifier, options),
        }
        .ok_or(ImageFetchingError::InvalidUrl)
    }

    /// Fetches the avatar for an email address or hash.
    ///
    /// # Errors
    /// Returns `InvalidUrl` for an empty identifier, before any request,
    /// otherwise as [`ImageDownloadService::fetch_image`].
    pub async fn fetch_image(
        &self,
        identifier: impl Into<AvatarIdentifier>,
        options: &ImageDownloadOptions,
    ) -> Result<ImageDownloadResult, ImageFetchingError> {
        let identifier = identifier.into();
        let avatar_url = self.avatar_url(&identifier, options.avatar_query.clone())?;
        debug!(url = %avatar_url, force_refresh = options.force_refresh, "Fetching avatar");
        self.downloader.fetch_image(avatar_url.url(), options).await
    }

    /// Fetches the image at an arbitrary URL.
    ///
    /// # Errors
    /// As [`ImageDownloadService::fetch_image`].
    pub async fn fetch_image_with_url(
        &self,
        url: &Url,
        options: &ImageDownloadOptions,
    ) -> Result<ImageDownloadResult, ImageFetchingError> {
        self.downloader.fetch_image(url, options).await
    }

    /// Uploads `image` as the avatar of `account`.
    ///
    /// # Errors
    /// As [`ImageUploadService::upload_image`].
    pub async fn upload_image(
        &self,
        image: &image::DynamicImage,
        account: &AccountIdentifier,
    ) -> Result<HttpResponse, ImageUploadError> {
        let response = self.uploader.upload_image(image, account).await?;
        info!(account = %account.email(), "Avatar uploaded");
        Ok(response)
    }
}

/// Ensures the base ends with `/` so identifiers are appended, not substituted.
fn normalize_base(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AccessToken, Email, HashId};
    use crate::domain::ports::mocks::{CacheMessageKind, MockHttpClient, RecordingImageCache};
    use crate::infrastructure::image::InMemoryImageCache;
    use crate::infrastructure::image::processor::test_support::png_bytes;

    const SOME_EMAIL_URL: &str = "https://gravatar.com/avatar/676212ff796c79a3c06261eb10e3f455aa93998ee6e45263da13679c74b1e674?d=404&s=240&r=g";

    fn service_with(client: &Arc<MockHttpClient>, cache: Arc<dyn ImageCaching>) -> ImageService {
        ImageService::new(client.clone(), cache)
    }

    #[tokio::test]
    async fn test_fetch_image() -> Result<(), Box<dyn std::error::Error>> {
        let client = Arc::new(MockHttpClient::success(png_bytes(4, 4)));
        let service = service_with(&client, Arc::new(InMemoryImageCache::new()));

        let result = service
            .fetch_image(Email::new("some@email.com"), &ImageDownloadOptions::default())
            .await?;

        let request = client.last_request().ok_or("no request recorded")?;
        assert_eq!(request.url.as_str(), SOME_EMAIL_URL);
        assert_eq!(result.source_url.as_str(), SOME_EMAIL_URL);
        assert_eq!(result.image.width(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_image_by_hash() -> Result<(), Box<dyn std::error::Error>> {
        let client = Arc::new(MockHttpClient::success(png_bytes(4, 4)));
        let service = service_with(&client, Arc::new(InMemoryImageCache::new()));
        let options = ImageDownloadOptions::default().with_avatar_query(AvatarQueryOptions::default());

        service.fetch_image(HashId::new("abc"), &options).await?;

        let request = client.last_request().ok_or("no request recorded")?;
        assert_eq!(request.url.as_str(), "https://gravatar.com/avatar/abc");
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_image_empty_identifier() {
        let client = Arc::new(MockHttpClient::success(png_bytes(4, 4)));
        let service = service_with(&client, Arc::new(InMemoryImageCache::new()));

        let result = service
            .fetch_image(Email::new(""), &ImageDownloadOptions::default())
            .await;

        assert_eq!(result.err(), Some(ImageFetchingError::InvalidUrl));
        assert_eq!(client.calls_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_image_not_found() {
        let client = Arc::new(MockHttpClient::new(404, ""));
        let service = service_with(&client, Arc::new(InMemoryImageCache::new()));

        let error = service
            .fetch_image(Email::new("some@email.com"), &ImageDownloadOptions::default())
            .await
            .expect_err("404 is an error");

        assert_eq!(error.http_status_code(), Some(404));
        assert_eq!(error.to_string(), "not found");
    }

    #[tokio::test]
    async fn test_force_refresh_enabled() -> Result<(), Box<dyn std::error::Error>> {
        let client = Arc::new(MockHttpClient::success(png_bytes(4, 4)));
        let cache = Arc::new(RecordingImageCache::new());
        let service = service_with(&client, cache.clone());
        let options = ImageDownloadOptions::default().with_force_refresh(true);

        service.fetch_image(Email::new("some@email.com"), &options).await?;
        service.fetch_image(Email::new("some@email.com"), &options).await?;
        service.fetch_image(Email::new("some@email.com"), &options).await?;

        assert_eq!(cache.message_count(CacheMessageKind::Get), 0, "We should not hit the cache");
        assert_eq!(client.calls_count(), 3, "We should fetch from network");
        Ok(())
    }

    #[tokio::test]
    async fn test_force_refresh_disabled() -> Result<(), Box<dyn std::error::Error>> {
        let client = Arc::new(MockHttpClient::success(png_bytes(4, 4)));
        let cache = Arc::new(RecordingImageCache::new());
        let service = service_with(&client, cache.clone());
        let options = ImageDownloadOptions::default().with_force_refresh(false);

        service.fetch_image(Email::new("some@email.com"), &options).await?;
        service.fetch_image(Email::new("some@email.com"), &options).await?;
        service.fetch_image(Email::new("some@email.com"), &options).await?;

        assert_eq!(cache.message_count(CacheMessageKind::Get), 3, "We should hit the cache");
        assert_eq!(cache.message_count(CacheMessageKind::Ready), 1, "We should save once to the cache");
        assert_eq!(client.calls_count(), 1, "We should fetch from network only the first time");
        Ok(())
    }

    #[tokio::test]
    async fn test_services_sharing_a_cache_share_downloads() -> Result<(), Box<dyn std::error::Error>> {
        let client = Arc::new(MockHttpClient::success(png_bytes(4, 4)));
        let cache: Arc<dyn ImageCaching> = Arc::new(InMemoryImageCache::new());
        let first = service_with(&client, cache.clone());
        let second = service_with(&client, cache);

        first
            .fetch_image(Email::new("some@email.com"), &ImageDownloadOptions::default())
            .await?;
        second
            .fetch_image(Email::new("SOME@email.com "), &ImageDownloadOptions::default())
            .await?;

        assert_eq!(client.calls_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_image() -> Result<(), Box<dyn std::error::Error>> {
        let client = Arc::new(MockHttpClient::success("Success"));
        let service = service_with(&client, Arc::new(InMemoryImageCache::new()));
        let account = AccountIdentifier::new(
            Email::new("some@email.com"),
            AccessToken::new("AccessToken").ok_or("empty token")?,
        );
        let img = image::load_from_memory(&png_bytes(4, 4))?;

        service.upload_image(&img, &account).await?;

        let request = client.last_request().ok_or("no request recorded")?;
        assert_eq!(request.url.as_str(), "https://api.gravatar.com/v1/upload-image");
        assert!(
            request
                .header("Authorization")
                .is_some_and(|value| value.starts_with("Bearer "))
        );
        assert!(
            request
                .header("Content-Type")
                .is_some_and(|value| value.starts_with("multipart/form-data; boundary=Boundary"))
        );
        Ok(())
    }

    #[test]
    fn test_from_config_normalizes_base() -> Result<(), Box<dyn std::error::Error>> {
        let config = ClientConfig {
            avatar_base_url: "https://avatars.example.com/img".to_string(),
            ..ClientConfig::default()
        };
        let service = ImageService::from_config(&config, Arc::new(InMemoryImageCache::new()))?;

        let url = service.avatar_url(
            &AvatarIdentifier::from(HashId::new("abc")),
            AvatarQueryOptions::default(),
        )?;
        assert_eq!(url.url().as_str(), "https://avatars.example.com/img/abc");
        Ok(())
    }
}
