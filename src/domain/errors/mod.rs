//! Domain error types.

mod fetch_error;
mod response_error;
mod upload_error;

pub use fetch_error::ImageFetchingError;
pub use response_error::{HttpClientError, ResponseErrorReason};
pub use upload_error::ImageUploadError;
