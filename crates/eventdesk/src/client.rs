//! The API client handle.

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::Result;
use crate::api::{AccountApi, DiscountCodesApi, EventsApi, LocationsApi, Mutation, Query, QueryCache};
use crate::auth::{AccessToken, SessionStorage, SessionStore};
use crate::backend::{BackendKind, BackendVariant};
use crate::error::AuthError;
use crate::config::ClientConfig;
use crate::guard::RouteGuard;
use crate::http::{ApiRequest, ApiResponse, HttpTransport, Pipeline, Transport};
use crate::navigation::{MemoryNavigator, Navigator};
use crate::notify::{Notifier, TracingNotifier};

/// An authenticated connection to the backend.
///
/// All backend calls made through a client share one [`SessionStore`], one
/// refresh gate and one query cache.
///
/// # Thread Safety
///
/// Clients are cheap to clone (they use internal `Arc`) and are safe to
/// share across tasks.
///
/// # Example
///
/// ```no_run
/// use eventdesk::{ApiClient, BaseUrl, ClientConfig, Credentials};
///
/// # async fn example() -> Result<(), eventdesk::Error> {
/// let config = ClientConfig::new(BaseUrl::new("https://api.example.com")?);
/// let client = ApiClient::new(config)?;
///
/// client
///     .account()
///     .login(Credentials::new("ada@example.com", "hunter2"))
///     .await?;
///
/// let _page = client.events().organizer_events(Default::default()).mount().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    pipeline: Arc<Pipeline>,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// A client with an in-memory session, logging notifier and in-memory
    /// navigator.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client can not be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder::new(config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The session shared by every request of this client.
    pub fn session(&self) -> &SessionStore {
        self.inner.pipeline.store()
    }

    pub fn backend(&self) -> BackendKind {
        self.inner.pipeline.variant().kind()
    }

    pub fn variant(&self) -> &Arc<dyn BackendVariant> {
        self.inner.pipeline.variant()
    }

    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.inner.notifier
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.inner.navigator
    }

    /// A route guard reading this client's session.
    pub fn guard(&self) -> RouteGuard {
        RouteGuard::new(self.session().clone(), self.inner.notifier.clone())
    }

    /// Path of a resource endpoint under the active backend's prefix.
    pub fn resource_path(&self, path: &str) -> String {
        self.variant().resource_path(path)
    }

    /// Send a request through the authenticated pipeline.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.inner.pipeline.send(request).await
    }

    /// A typed GET of `path`.
    pub fn query<T: DeserializeOwned>(&self, path: impl Into<String>) -> Query<T> {
        Query::new(self.inner.pipeline.clone(), self.inner.cache.clone(), path)
    }

    /// A typed write to `path`.
    pub fn mutation(&self, method: Method, path: impl Into<String>) -> Mutation {
        Mutation::new(
            self.inner.pipeline.clone(),
            self.inner.cache.clone(),
            method,
            path,
        )
    }

    /// Exchange the refresh token now, outside of any failed request.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<AccessToken> {
        self.inner.pipeline.refresher().refresh().await
    }

    /// Fails with [`AuthError::NotAuthenticated`] when no access token is stored.
    ///
    /// Lets callers refuse to start work that can only end in a login redirect.
    pub fn require_session(&self) -> Result<()> {
        if self.session().access_token().is_none() {
            return Err(AuthError::NotAuthenticated.into());
        }
        Ok(())
    }

    /// Forget the session and every cached response.
    pub fn logout(&self) {
        info!("Logging out");
        self.session().clear();
        self.inner.cache.clear();
    }

    pub fn account(&self) -> AccountApi<'_> {
        AccountApi::new(self)
    }

    pub fn events(&self) -> EventsApi<'_> {
        EventsApi::new(self)
    }

    pub fn discount_codes(&self) -> DiscountCodesApi<'_> {
        DiscountCodesApi::new(self)
    }

    pub fn locations(&self) -> LocationsApi<'_> {
        LocationsApi::new(self)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.config.base_url.as_str())
            .field("backend", &self.backend())
            .field("session", self.session())
            .finish()
    }
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    config: ClientConfig,
    storage: Option<Arc<dyn SessionStorage>>,
    session: Option<SessionStore>,
    transport: Option<Arc<dyn Transport>>,
    notifier: Option<Arc<dyn Notifier>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl ApiClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            storage: None,
            session: None,
            transport: None,
            notifier: None,
            navigator: None,
        }
    }

    /// Restore the session from `storage` and persist it there.
    pub fn storage(mut self, storage: Arc<dyn SessionStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Use an existing session store. Takes precedence over [`Self::storage`].
    pub fn session(mut self, session: SessionStore) -> Self {
        self.session = Some(session);
        self
    }

    /// Replace the HTTP transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if no transport was given and the HTTP client can
    /// not be built.
    pub fn build(self) -> Result<ApiClient> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(
                self.config.base_url.clone(),
                &self.config.user_agent,
                self.config.timeout,
            )?),
        };

        let session = match (self.session, self.storage) {
            (Some(session), _) => session,
            (None, Some(storage)) => SessionStore::restore(storage),
            (None, None) => SessionStore::in_memory(),
        };

        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(TracingNotifier) as Arc<dyn Notifier>);
        let navigator = self
            .navigator
            .unwrap_or_else(|| Arc::new(MemoryNavigator::default()) as Arc<dyn Navigator>);

        debug!(
            base_url = %self.config.base_url,
            backend = %self.config.backend,
            "Building API client"
        );

        let pipeline = Pipeline::new(
            transport,
            session,
            self.config.backend.variant(),
            notifier.clone(),
            navigator.clone(),
        );

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                config: self.config,
                pipeline: Arc::new(pipeline),
                cache: QueryCache::new(),
                notifier,
                navigator,
            }),
        })
    }
}
