//! HTTP transport port definition.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;

use crate::domain::errors::HttpClientError;

/// HTTP method supported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET.
    Get,
    /// POST.
    Post,
}

/// A request handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Method.
    pub method: HttpMethod,
    /// Target URL.
    pub url: Url,
    /// Header name/value pairs, in insertion order.
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Creates a GET request.
    #[must_use]
    pub const fn get(url: Url) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
        }
    }

    /// Creates a POST request.
    #[must_use]
    pub const fn post(url: Url) -> Self {
        Self {
            method: HttpMethod::Post,
            url,
            headers: Vec::new(),
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Looks up a header value, ignoring name case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A response returned by the transport, whatever its status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Final URL after redirects.
    pub url: Url,
    /// Response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Port for performing HTTP requests.
///
/// Non-2xx statuses are returned as responses; only failures to obtain a
/// response at all are errors.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Performs a request without a body.
    async fn fetch_data(&self, request: HttpRequest) -> Result<HttpResponse, HttpClientError>;

    /// Performs a request with a body.
    async fn upload_data(
        &self,
        request: HttpRequest,
        body: Bytes,
    ) -> Result<HttpResponse, HttpClientError>;
}
