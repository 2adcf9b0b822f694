//! reqwest-backed HTTP transport.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Method};
use tracing::{debug, warn};

use crate::domain::errors::HttpClientError;
use crate::domain::ports::{HttpClient, HttpMethod, HttpRequest, HttpResponse};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("gravatar-rs/", env!("CARGO_PKG_VERSION"));

/// HTTP transport over a pooled reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Creates a client with the default timeout and user agent.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new() -> Result<Self, HttpClientError> {
        Self::with_settings(Duration::from_secs(DEFAULT_TIMEOUT_SECS), DEFAULT_USER_AGENT)
    }

    /// Creates a client with a custom timeout and user agent.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn with_settings(timeout: Duration, user_agent: &str) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| HttpClientError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    async fn send(
        &self,
        request: HttpRequest,
        body: Option<Bytes>,
    ) -> Result<HttpResponse, HttpClientError> {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };

        debug!(method = %method, url = %request.url, "Sending request");

        let mut builder = self.client.request(method, request.url);
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let url = response.url().clone();
        let body = response.bytes().await.map_err(|e| {
            warn!(error = %e, "Failed to read response body");
            map_reqwest_error(e)
        })?;

        debug!(status, url = %url, bytes = body.len(), "Received response");

        Ok(HttpResponse { status, url, body })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> HttpClientError {
    if e.is_timeout() {
        HttpClientError::Timeout
    } else if e.is_connect() {
        HttpClientError::Transport(format!("failed to connect: {e}"))
    } else if e.is_decode() {
        HttpClientError::Decoding(e.to_string())
    } else if e.is_body() {
        HttpClientError::InvalidResponse
    } else {
        HttpClientError::Transport(e.to_string())
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn fetch_data(&self, request: HttpRequest) -> Result<HttpResponse, HttpClientError> {
        self.send(request, None).await
    }

    async fn upload_data(
        &self,
        request: HttpRequest,
        body: Bytes,
    ) -> Result<HttpResponse, HttpClientError> {
        self.send(request, Some(body)).await
    }
}
