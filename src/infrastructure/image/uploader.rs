//! Avatar upload service.

use std::io::Cursor;
use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::entities::AccountIdentifier;
use crate::domain::errors::{ImageUploadError, ResponseErrorReason};
use crate::domain::ports::{HttpClient, HttpRequest, HttpResponse};

/// Endpoint accepting avatar uploads.
pub const DEFAULT_UPLOAD_URL: &str = "https://api.gravatar.com/v1/upload-image";

const IMAGE_PART_NAME: &str = "filedata";
const IMAGE_FILENAME: &str = "profile.png";
const IMAGE_CONTENT_TYPE: &str = "application/octet-stream";
const ACCOUNT_PART_NAME: &str = "account";

/// Error payload returned by the Gravatar REST API.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: String,
    #[serde(default)]
    code: Option<String>,
}

/// Uploads avatar images for an authenticated account.
#[derive(Clone)]
pub struct ImageUploadService {
    client: Arc<dyn HttpClient>,
    upload_url: String,
}

impl std::fmt::Debug for ImageUploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUploadService")
            .field("upload_url", &self.upload_url)
            .finish_non_exhaustive()
    }
}

impl ImageUploadService {
    /// Creates a service posting to [`DEFAULT_UPLOAD_URL`].
    #[must_use]
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self::with_upload_url(client, DEFAULT_UPLOAD_URL)
    }

    /// Creates a service posting to a custom endpoint.
    #[must_use]
    pub fn with_upload_url(client: Arc<dyn HttpClient>, upload_url: impl Into<String>) -> Self {
        Self {
            client,
            upload_url: upload_url.into(),
        }
    }

    /// Encodes `image` as PNG and uploads it.
    ///
    /// # Errors
    /// Returns `CannotConvertImageIntoData` if encoding fails, before any
    /// request is made, otherwise as [`upload_image_data`](Self::upload_image_data).
    pub async fn upload_image(
        &self,
        image: &image::DynamicImage,
        account: &AccountIdentifier,
    ) -> Result<HttpResponse, ImageUploadError> {
        let data = encode_png(image)?;
        self.upload_image_data(data, account).await
    }

    /// Uploads already-encoded image bytes.
    ///
    /// # Errors
    /// Returns `ResponseError` on transport failures, non-2xx statuses, or an
    /// unparseable upload endpoint.
    pub async fn upload_image_data(
        &self,
        data: Bytes,
        account: &AccountIdentifier,
    ) -> Result<HttpResponse, ImageUploadError> {
        let url = Url::parse(&self.upload_url).map_err(|e| {
            ImageUploadError::response(ResponseErrorReason::unexpected(format!(
                "invalid upload URL {}: {e}",
                self.upload_url
            )))
        })?;

        let boundary = format!("Boundary-{}", uuid::Uuid::new_v4());
        let request = HttpRequest::post(url)
            .with_header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .with_header("Authorization", account.access_token().bearer());
        let body = image_upload_body(&data, account.email().as_str(), &boundary);

        debug!(
            account = %account.email(),
            token = %account.access_token(),
            bytes = data.len(),
            "Uploading avatar image"
        );

        let response = self
            .client
            .upload_data(request, body)
            .await
            .map_err(|e| {
                warn!(error = %e, "Avatar upload request failed");
                ImageUploadError::response(e.into())
            })?;

        if !response.is_success() {
            let reason = error_reason(&response);
            warn!(status = response.status, reason = %reason, "Avatar upload rejected");
            return Err(ImageUploadError::response(reason));
        }

        debug!(status = response.status, "Avatar uploaded successfully");
        Ok(response)
    }
}

fn encode_png(image: &image::DynamicImage) -> Result<Bytes, ImageUploadError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, image::ImageFormat::Png)
        .map_err(|e| {
            warn!(error = %e, "Failed to encode avatar as PNG");
            ImageUploadError::CannotConvertImageIntoData
        })?;
    Ok(Bytes::from(buffer.into_inner()))
}

fn error_reason(response: &HttpResponse) -> ResponseErrorReason {
    let message = if response.body.is_empty() {
        None
    } else {
        serde_json::from_slice::<ApiErrorResponse>(&response.body)
            .ok()
            .map(|body| match body.code {
                Some(code) => format!("{} ({code})", body.error),
                None => body.error,
            })
    };

    ResponseErrorReason::InvalidHttpStatusCode {
        status: response.status,
        message,
    }
}

/// Builds the multipart body: the image part, then the account part.
#[must_use]
pub fn image_upload_body(data: &[u8], account: &str, boundary: &str) -> Bytes {
    let mut body = BytesMut::with_capacity(data.len() + 512);

    body.put_slice(format!("--{boundary}\r\n").as_bytes());
    body.put_slice(
        format!(
            "Content-Disposition: form-data; name=\"{IMAGE_PART_NAME}\"; filename=\"{IMAGE_FILENAME}\"\r\n"
        )
        .as_bytes(),
    );
    body.put_slice(format!("Content-Type: {IMAGE_CONTENT_TYPE}\r\n\r\n").as_bytes());
    body.put_slice(data);
    body.put_slice(b"\r\n");

    body.put_slice(format!("--{boundary}\r\n").as_bytes());
    body.put_slice(
        format!("Content-Disposition: form-data; name=\"{ACCOUNT_PART_NAME}\"\r\n\r\n").as_bytes(),
    );
    body.put_slice(account.as_bytes());
    body.put_slice(b"\r\n");

    body.put_slice(format!("--{boundary}--\r\n").as_bytes());

    body.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AccessToken, Email};
    use crate::domain::errors::HttpClientError;
    use crate::domain::ports::mocks::MockHttpClient;
    use crate::infrastructure::image::processor::test_support::png_bytes;

    fn account() -> AccountIdentifier {
        AccountIdentifier::new(
            Email::new("some@email.com"),
            AccessToken::new("AccessToken").expect("non-empty token"),
        )
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack
            .windows(needle.len())
            .position(|window| window == needle)
    }

    /// Splits a multipart body into (headers, content) per part.
    fn parts(body: &[u8], boundary: &str) -> Vec<(String, Vec<u8>)> {
        let delimiter = format!("--{boundary}");
        let mut parts = Vec::new();
        let mut rest = body;
        while let Some(start) = find(rest, delimiter.as_bytes()) {
            rest = &rest[start + delimiter.len()..];
            if rest.starts_with(b"--") {
                break;
            }
            rest = &rest[2..];
            let headers_end = find(rest, b"\r\n\r\n").expect("part headers terminate");
            let headers = String::from_utf8_lossy(&rest[..headers_end]).to_string();
            rest = &rest[headers_end + 4..];
            let content_end = find(rest, format!("\r\n{delimiter}").as_bytes())
                .expect("part content terminates");
            parts.push((headers, rest[..content_end].to_vec()));
            rest = &rest[content_end + 2..];
        }
        parts
    }

    #[test]
    fn test_upload_body_round_trip() {
        let data = b"\x89PNG\r\n--not-a-boundary\r\n\x00\xff".to_vec();
        let body = image_upload_body(&data, "some@email.com", "Boundary-123");

        let parts = parts(&body, "Boundary-123");
        assert_eq!(parts.len(), 2);

        assert!(parts[0].0.contains("name=\"filedata\""));
        assert!(parts[0].0.contains("filename=\"profile.png\""));
        assert!(parts[0].0.contains("Content-Type: application/octet-stream"));
        assert_eq!(parts[0].1, data);

        assert!(parts[1].0.contains("name=\"account\""));
        assert_eq!(parts[1].1, b"some@email.com".to_vec());

        assert!(body.ends_with(b"--Boundary-123--\r\n"));
    }

    #[tokio::test]
    async fn test_upload_image() -> Result<(), Box<dyn std::error::Error>> {
        let client = Arc::new(MockHttpClient::success("Success"));
        let service = ImageUploadService::new(client.clone());
        let img = image::load_from_memory(&png_bytes(4, 4))?;

        service.upload_image(&img, &account()).await?;

        let request = client.last_request().ok_or("no request recorded")?;
        assert_eq!(request.url.as_str(), DEFAULT_UPLOAD_URL);
        assert_eq!(request.header("authorization"), Some("Bearer AccessToken"));

        let content_type = request.header("Content-Type").ok_or("no content type")?;
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .ok_or("not multipart")?;
        assert!(boundary.starts_with("Boundary-"));

        let body = client.last_body().ok_or("no body recorded")?;
        let parts = parts(&body, boundary);
        let uploaded = image::load_from_memory(&parts[0].1)?;
        assert_eq!((uploaded.width(), uploaded.height()), (4, 4));
        assert_eq!(parts[1].1, b"some@email.com".to_vec());
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_image_timeout_status() {
        let client = Arc::new(MockHttpClient::new(408, "Error"));
        let service = ImageUploadService::new(client);

        let error = service
            .upload_image_data(Bytes::from(png_bytes(2, 2)), &account())
            .await
            .expect_err("408 is an error");

        assert_eq!(error.to_string(), "request timed out");
    }

    #[tokio::test]
    async fn test_upload_image_unsupported_media_type() {
        let client = Arc::new(MockHttpClient::new(415, "Error"));
        let service = ImageUploadService::new(client);

        let error = service
            .upload_image_data(Bytes::from(png_bytes(2, 2)), &account())
            .await
            .expect_err("415 is an error");

        assert_eq!(error.to_string(), "unsupported media type");
    }

    #[tokio::test]
    async fn test_upload_decodes_api_error_body() {
        let client = Arc::new(MockHttpClient::new(
            400,
            r#"{"error":"Image too small","code":"image_too_small"}"#,
        ));
        let service = ImageUploadService::new(client);

        let error = service
            .upload_image_data(Bytes::from(png_bytes(2, 2)), &account())
            .await
            .expect_err("400 is an error");

        assert_eq!(
            error,
            ImageUploadError::response(ResponseErrorReason::InvalidHttpStatusCode {
                status: 400,
                message: Some("Image too small (image_too_small)".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn test_upload_transport_error() {
        let client = Arc::new(MockHttpClient::success("Success"));
        client.set_failure(Some(HttpClientError::Transport("connection reset".to_string())));
        let service = ImageUploadService::new(client);

        let error = service
            .upload_image_data(Bytes::from(png_bytes(2, 2)), &account())
            .await
            .expect_err("transport failure is an error");

        assert_eq!(
            error,
            ImageUploadError::response(ResponseErrorReason::TransportError(
                "connection reset".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_upload_image_data_error() {
        let client = Arc::new(MockHttpClient::success("Success"));
        let service = ImageUploadService::new(client.clone());

        let error = service
            .upload_image(&image::DynamicImage::new_rgb8(0, 0), &account())
            .await
            .expect_err("empty image cannot be encoded");

        assert_eq!(error, ImageUploadError::CannotConvertImageIntoData);
        assert_eq!(client.calls_count(), 0);
    }
}
