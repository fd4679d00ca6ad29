//! Plain request execution.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderValue};
use tracing::{debug, instrument, trace};

use crate::Result;
use crate::error::TransportError;
use crate::types::BaseUrl;

use super::request::{ApiRequest, ApiResponse, RequestBody};

/// Sends a request and returns whatever the server answered.
///
/// Implementations return `Err` only when no response was received; every
/// HTTP status, including 4xx and 5xx, comes back as an [`ApiResponse`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

/// HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: BaseUrl,
}

impl HttpTransport {
    /// Create a transport for the given base URL.
    pub fn new(base: BaseUrl, user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| TransportError::Http {
            message: format!("failed to build HTTP client: {}", e),
        })?;

        Ok(Self { client, base })
    }

    /// Returns the base URL this transport is configured for.
    pub fn base(&self) -> &BaseUrl {
        &self.base
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = self.base.endpoint(request.path());
        debug!(%url, "Sending request");
        trace!(params = ?request.params(), "query parameters");

        let mut builder = self
            .client
            .request(request.method().clone(), &url)
            .headers(request.headers().clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if !request.params().is_empty() {
            builder = builder.query(request.params());
        }

        // reqwest sets the multipart content type with its boundary.
        match request.request_body() {
            Some(RequestBody::Json(body)) => builder = builder.json(body),
            Some(RequestBody::Multipart(form)) => builder = builder.multipart(form.to_reqwest()?),
            None => {}
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        trace!(status = %status, len = body.len(), "Response received");
        Ok(ApiResponse::new(status, headers, body))
    }
}
