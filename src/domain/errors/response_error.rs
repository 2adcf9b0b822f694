//! Transport and HTTP response error types.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors reported by an HTTP transport adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum HttpClientError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response")]
    InvalidResponse,

    #[error("failed to decode response body: {0}")]
    Decoding(String),
}

/// Why a request to Gravatar did not produce a usable response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum ResponseErrorReason {
    #[error("{}", describe_status(*status, message.as_deref()))]
    InvalidHttpStatusCode {
        status: u16,
        message: Option<String>,
    },

    #[error("request timed out")]
    Timeout,

    #[error("failed to decode response: {0}")]
    DecodingError(String),

    #[error("transport error: {0}")]
    TransportError(String),

    #[error("invalid response")]
    InvalidUrlResponse,

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ResponseErrorReason {
    /// Creates a status error without a server message.
    #[must_use]
    pub const fn status(status: u16) -> Self {
        Self::InvalidHttpStatusCode {
            status,
            message: None,
        }
    }

    /// Creates unexpected error.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Returns the HTTP status code, if the server produced one.
    #[must_use]
    pub const fn http_status_code(&self) -> Option<u16> {
        match self {
            Self::InvalidHttpStatusCode { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns whether the request timed out, client or server side.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::InvalidHttpStatusCode { status: 408, .. }
        )
    }
}

impl From<HttpClientError> for ResponseErrorReason {
    fn from(error: HttpClientError) -> Self {
        match error {
            HttpClientError::Timeout => Self::Timeout,
            HttpClientError::Transport(message) => Self::TransportError(message),
            HttpClientError::InvalidResponse => Self::InvalidUrlResponse,
            HttpClientError::Decoding(message) => Self::DecodingError(message),
        }
    }
}

/// Lowercase human description of a status code.
fn describe_status(status: u16, message: Option<&str>) -> String {
    let description = match status {
        408 => "request timed out".to_string(),
        _ => StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .map_or_else(|| format!("http status {status}"), str::to_lowercase),
    };

    match message {
        Some(message) if !message.is_empty() => format!("{description}: {message}"),
        _ => description,
    }
}
