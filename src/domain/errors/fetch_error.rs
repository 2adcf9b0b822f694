//! Avatar download error types.

use thiserror::Error;

use super::ResponseErrorReason;

/// Errors surfaced by image fetching.
///
/// Cloneable so that one failed download can be delivered to every caller
/// waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum ImageFetchingError {
    #[error("invalid avatar URL")]
    InvalidUrl,

    #[error("{reason}")]
    ResponseError { reason: ResponseErrorReason },

    #[error("image processor failed")]
    ImageProcessorFailed,
}

impl ImageFetchingError {
    /// Wraps a response failure.
    #[must_use]
    pub const fn response(reason: ResponseErrorReason) -> Self {
        Self::ResponseError { reason }
    }

    /// Returns the HTTP status code behind this error, if any.
    #[must_use]
    pub const fn http_status_code(&self) -> Option<u16> {
        match self {
            Self::ResponseError { reason } => reason.http_status_code(),
            _ => None,
        }
    }
}

impl From<ResponseErrorReason> for ImageFetchingError {
    fn from(reason: ResponseErrorReason) -> Self {
        Self::response(reason)
    }
}
