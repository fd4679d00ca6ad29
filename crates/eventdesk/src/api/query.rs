//! Declarative reads with a shared response cache.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, instrument};

use crate::Result;
use crate::http::{ApiRequest, Params, Pipeline};

/// Identifies one cached response: a key plus the parameters it was
/// fetched with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub key: String,
    pub params: Params,
}

impl QueryKey {
    pub fn new(key: impl Into<String>, params: Params) -> Self {
        Self {
            key: key.into(),
            params,
        }
    }
}

/// When a mounted query goes back to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefetchOnMount {
    /// Use any cached response.
    Never,
    /// Fetch when the cached response is older than the stale time.
    #[default]
    IfStale,
    /// Always fetch.
    Always,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Value,
    fetched_at: Instant,
}

/// Responses shared by every query of a client, keyed by [`QueryKey`].
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    entries: Arc<Mutex<HashMap<QueryKey, CacheEntry>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached body for `key`.
    pub fn get(&self, key: &QueryKey) -> Option<Value> {
        self.lock().get(key).map(|entry| entry.data.clone())
    }

    pub fn insert(&self, key: QueryKey, data: Value) {
        self.lock().insert(
            key,
            CacheEntry {
                data,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Drop one entry.
    pub fn invalidate(&self, key: &QueryKey) {
        self.lock().remove(key);
    }

    /// Drop every entry stored under `key`, whatever its parameters.
    pub fn invalidate_key(&self, key: &str) {
        self.lock().retain(|k, _| k.key != key);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn entry(&self, key: &QueryKey) -> Option<CacheEntry> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

type ParamsFn = Box<dyn Fn() -> Params + Send + Sync>;
type EnabledFn = Box<dyn Fn() -> bool + Send + Sync>;

/// A typed GET against one endpoint.
///
/// Parameters and the `enabled` gate are closures, evaluated again on every
/// mount or refetch. Failed fetches are never retried.
pub struct Query<T> {
    pipeline: Arc<Pipeline>,
    cache: QueryCache,
    path: String,
    key: String,
    params: ParamsFn,
    enabled: EnabledFn,
    refetch_on_mount: RefetchOnMount,
    stale_time: Duration,
    select_data: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Query<T> {
    /// A query for `path`, cached under the path itself.
    pub(crate) fn new(pipeline: Arc<Pipeline>, cache: QueryCache, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            pipeline,
            cache,
            key: path.clone(),
            path,
            params: Box::new(Params::new),
            enabled: Box::new(|| true),
            refetch_on_mount: RefetchOnMount::default(),
            stale_time: Duration::ZERO,
            select_data: false,
            _marker: PhantomData,
        }
    }

    /// Cache under `key` instead of the path.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Fixed query parameters.
    pub fn params(self, params: Params) -> Self {
        self.params_with(move || params.clone())
    }

    /// Parameters computed on every fetch.
    pub fn params_with(mut self, params: impl Fn() -> Params + Send + Sync + 'static) -> Self {
        self.params = Box::new(params);
        self
    }

    pub fn enabled(self, enabled: bool) -> Self {
        self.enabled_with(move || enabled)
    }

    /// Gate evaluated on every mount.
    pub fn enabled_with(mut self, enabled: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.enabled = Box::new(enabled);
        self
    }

    pub fn refetch_on_mount(mut self, policy: RefetchOnMount) -> Self {
        self.refetch_on_mount = policy;
        self
    }

    /// How long a fetched response counts as fresh.
    pub fn stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    /// Unwrap a top-level `data` envelope when the response has one.
    pub fn select_data(mut self, select: bool) -> Self {
        self.select_data = select;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The cache key for the current parameters.
    pub fn cache_key(&self) -> QueryKey {
        QueryKey::new(self.key.clone(), (self.params)())
    }

    pub fn is_enabled(&self) -> bool {
        (self.enabled)()
    }

    /// Produce the query's data as a view would on mount.
    ///
    /// A disabled query only reports what is cached. Otherwise the refetch
    /// policy decides between the cached response and a fetch.
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn mount(&self) -> Result<Option<T>> {
        let key = self.cache_key();

        if !self.is_enabled() {
            debug!("Query disabled");
            return self.decode_cached(&key);
        }

        if let Some(entry) = self.cache.entry(&key) {
            let use_cache = match self.refetch_on_mount {
                RefetchOnMount::Never => true,
                RefetchOnMount::IfStale => entry.fetched_at.elapsed() < self.stale_time,
                RefetchOnMount::Always => false,
            };
            if use_cache {
                debug!("Serving cached response");
                return Ok(Some(serde_json::from_value(entry.data)?));
            }
        }

        self.fetch(key).await.map(Some)
    }

    /// Fetch now, regardless of the gate and the cache.
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn refetch(&self) -> Result<T> {
        self.fetch(self.cache_key()).await
    }

    /// The cached data for the current parameters.
    pub fn cached(&self) -> Result<Option<T>> {
        self.decode_cached(&self.cache_key())
    }

    /// Forget the cached response for the current parameters.
    pub fn invalidate(&self) {
        self.cache.invalidate(&self.cache_key());
    }

    fn decode_cached(&self, key: &QueryKey) -> Result<Option<T>> {
        match self.cache.get(key) {
            Some(data) => Ok(Some(serde_json::from_value(data)?)),
            None => Ok(None),
        }
    }

    async fn fetch(&self, key: QueryKey) -> Result<T> {
        let request = ApiRequest::get(self.path.as_str()).with_params(key.params.clone());
        let body = self.pipeline.send(request).await?.json_value()?;
        let data = if self.select_data {
            select_data(body)
        } else {
            body
        };

        let decoded = serde_json::from_value(data.clone())?;
        self.cache.insert(key, data);
        Ok(decoded)
    }
}

impl<T> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("path", &self.path)
            .field("key", &self.key)
            .field("refetch_on_mount", &self.refetch_on_mount)
            .field("stale_time", &self.stale_time)
            .field("select_data", &self.select_data)
            .finish()
    }
}

/// The `data` member of an enveloped body, or the body itself.
pub fn select_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) => data,
            None => Value::Object(map),
        },
        other => other,
    }
}
