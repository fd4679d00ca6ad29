//! Typed writes.

use std::fmt;
use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use super::query::QueryCache;
use crate::Result;
use crate::http::{ApiRequest, ApiResponse, MultipartForm, Pipeline};

/// One write endpoint: a method and a path.
///
/// Every call is exactly one pipeline request. On success the cache keys
/// registered with [`Mutation::invalidates`] are dropped so dependent
/// queries fetch again.
pub struct Mutation {
    pipeline: Arc<Pipeline>,
    cache: QueryCache,
    method: Method,
    path: String,
    invalidates: Vec<String>,
}

impl Mutation {
    pub(crate) fn new(
        pipeline: Arc<Pipeline>,
        cache: QueryCache,
        method: Method,
        path: impl Into<String>,
    ) -> Self {
        Self {
            pipeline,
            cache,
            method,
            path: path.into(),
            invalidates: Vec::new(),
        }
    }

    /// Drop cached responses under `key` after a successful call.
    pub fn invalidates(mut self, key: impl Into<String>) -> Self {
        self.invalidates.push(key.into());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Send `body` as JSON and decode the response.
    pub async fn send<B, R>(&self, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.execute(Some(body)).await?.decode()
    }

    /// Send without a body and decode the response.
    pub async fn send_empty<R: DeserializeOwned>(&self) -> Result<R> {
        self.execute(None).await?.decode()
    }

    /// Send `form` as `multipart/form-data` and decode the response.
    #[instrument(skip(self, form), fields(method = %self.method, path = %self.path))]
    pub async fn send_form<R: DeserializeOwned>(&self, form: MultipartForm) -> Result<R> {
        let request = ApiRequest::new(self.method.clone(), self.path.as_str()).with_multipart(form);
        self.dispatch(request).await?.decode()
    }

    /// Send and return the raw response.
    #[instrument(skip(self, body), fields(method = %self.method, path = %self.path))]
    pub async fn execute(&self, body: Option<Value>) -> Result<ApiResponse> {
        let mut request = ApiRequest::new(self.method.clone(), self.path.as_str());
        if let Some(body) = body {
            request = request.with_json(body);
        }
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse> {
        let response = self.pipeline.send(request).await?;

        for key in &self.invalidates {
            debug!(%key, "Invalidating cached query");
            self.cache.invalidate_key(key);
        }
        Ok(response)
    }
}

impl fmt::Debug for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutation")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("invalidates", &self.invalidates)
            .finish()
    }
}
