//! Avatar upload error types.

use thiserror::Error;

use super::ResponseErrorReason;

/// Errors surfaced by image uploads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum ImageUploadError {
    #[error("cannot convert image into data")]
    CannotConvertImageIntoData,

    #[error("{reason}")]
    ResponseError { reason: ResponseErrorReason },
}

impl ImageUploadError {
    /// Wraps a response failure.
    #[must_use]
    pub const fn response(reason: ResponseErrorReason) -> Self {
        Self::ResponseError { reason }
    }
}

impl From<ResponseErrorReason> for ImageUploadError {
    fn from(reason: ResponseErrorReason) -> Self {
        Self::response(reason)
    }
}
