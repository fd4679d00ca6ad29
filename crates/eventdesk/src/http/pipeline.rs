//! The authenticated request pipeline.
//!
//! Every backend call goes through [`Pipeline::send`], which runs two stages
//! around the plain [`Transport`]:
//!
//! - `before_send` attaches the current access token.
//! - `after_receive` passes successes through and, for a stale-token
//!   rejection of a request that has not been replayed yet, refreshes the
//!   token pair and asks for one replay.
//!
//! Refreshes are serialized per pipeline. A request that was rejected with a
//! token some other request has already replaced reuses the replacement
//! instead of refreshing again.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::SESSION_EXPIRED_MESSAGE;
use super::request::{ApiRequest, ApiResponse};
use super::transport::Transport;
use crate::auth::{AccessToken, SessionStore, TokenRefresher};
use crate::backend::BackendVariant;
use crate::error::{AuthError, Error};
use crate::navigation::{Navigator, login_redirect};
use crate::notify::{NotificationKind, Notifier};
use crate::Result;

/// What `after_receive` decided.
enum Verdict {
    Deliver(ApiResponse),
    Replay,
}

/// The single egress point for backend calls.
pub struct Pipeline {
    transport: Arc<dyn Transport>,
    store: SessionStore,
    variant: Arc<dyn BackendVariant>,
    refresher: TokenRefresher,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    refresh_gate: Mutex<()>,
}

impl Pipeline {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: SessionStore,
        variant: Arc<dyn BackendVariant>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let refresher = TokenRefresher::new(transport.clone(), store.clone(), variant.clone());
        Self {
            transport,
            store,
            variant,
            refresher,
            notifier,
            navigator,
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn variant(&self) -> &Arc<dyn BackendVariant> {
        &self.variant
    }

    pub fn refresher(&self) -> &TokenRefresher {
        &self.refresher
    }

    /// The raw transport, for calls that must not carry credentials.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Send `request` and return the successful response.
    ///
    /// A request is replayed at most once, after a successful refresh; the
    /// replay's outcome is final.
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse> {
        loop {
            self.before_send(&mut request);
            let outcome = self.transport.execute(&request).await;
            match self.after_receive(&mut request, outcome).await? {
                Verdict::Deliver(response) => return Ok(response),
                Verdict::Replay => debug!("Replaying request with refreshed token"),
            }
        }
    }

    fn before_send(&self, request: &mut ApiRequest) {
        if let Some(token) = self.store.access_token() {
            request.set_bearer(&token);
        }
    }

    async fn after_receive(
        &self,
        request: &mut ApiRequest,
        outcome: Result<ApiResponse>,
    ) -> Result<Verdict> {
        let response = outcome?;
        if response.status().is_success() {
            return Ok(Verdict::Deliver(response));
        }

        let error = response.into_error();
        if request.is_retried() || !self.variant.is_stale_token(&error) {
            debug!(status = error.status, "Request failed");
            return Err(error.into());
        }

        debug!("Access token is stale");
        request.mark_retried();
        let token = self.refresh_after(request.bearer_token()).await?;
        request.set_bearer(&token);
        Ok(Verdict::Replay)
    }

    /// Get a usable access token after `stale` was rejected.
    async fn refresh_after(&self, stale: Option<AccessToken>) -> Result<AccessToken> {
        let _gate = self.refresh_gate.lock().await;

        let Some(tokens) = self.store.snapshot().tokens else {
            debug!("Session was cleared while waiting for refresh");
            return Err(AuthError::SessionExpired.into());
        };

        if stale.as_ref() != Some(&tokens.access) {
            debug!("Token already refreshed by another request");
            return Ok(tokens.access);
        }

        match self.refresher.refresh().await {
            Ok(token) => Ok(token),
            Err(e) => {
                self.expire_session(&e);
                Err(e)
            }
        }
    }

    fn expire_session(&self, cause: &Error) {
        warn!(error = %cause, "Refresh failed, ending session");
        self.notifier
            .notify(NotificationKind::Error, SESSION_EXPIRED_MESSAGE);
        self.store.clear();

        let location = self.navigator.current_location();
        self.navigator.navigate(&login_redirect(&location));
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("backend", &self.variant.kind())
            .field("store", &self.store)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::RefreshToken;
    use crate::backend::BackendKind;
    use crate::error::TransportError;
    use crate::navigation::MemoryNavigator;
    use crate::notify::ToastQueue;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    /// Answers requests from a script, in order, and records what it saw.
    #[derive(Default)]
    struct ScriptedTransport {
        script: StdMutex<VecDeque<Result<ApiResponse>>>,
        seen: StdMutex<Vec<ApiRequest>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<ApiResponse>>) -> Arc<Self> {
            Arc::new(Self {
                script: StdMutex::new(script.into()),
                seen: StdMutex::default(),
            })
        }

        fn seen(&self) -> Vec<ApiRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
            self.seen.lock().unwrap().push(request.clone());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .expect("transport script exhausted")
        }
    }

    fn reply(status: StatusCode, body: Value) -> Result<ApiResponse> {
        Ok(ApiResponse::json(status, &body))
    }

    fn stale() -> Result<ApiResponse> {
        reply(
            StatusCode::UNAUTHORIZED,
            json!({"detail": "Given token not valid for any token type", "code": "token_not_valid"}),
        )
    }

    fn refreshed(access: &str, refresh: &str) -> Result<ApiResponse> {
        reply(StatusCode::OK, json!({"access": access, "refresh": refresh}))
    }

    struct Harness {
        transport: Arc<ScriptedTransport>,
        store: SessionStore,
        toasts: Arc<ToastQueue>,
        navigator: Arc<MemoryNavigator>,
        pipeline: Pipeline,
    }

    fn harness(script: Vec<Result<ApiResponse>>) -> Harness {
        let transport = ScriptedTransport::new(script);
        let store = SessionStore::in_memory();
        store.set_credentials(AccessToken::new("a1"), RefreshToken::new("r1"));
        let toasts = Arc::new(ToastQueue::new());
        let navigator = Arc::new(MemoryNavigator::new("/events/42"));
        let pipeline = Pipeline::new(
            transport.clone(),
            store.clone(),
            BackendKind::Legacy.variant(),
            toasts.clone(),
            navigator.clone(),
        );
        Harness {
            transport,
            store,
            toasts,
            navigator,
            pipeline,
        }
    }

    #[tokio::test]
    async fn attaches_bearer_token() {
        let h = harness(vec![reply(StatusCode::OK, json!({"id": 42}))]);

        let response = h.pipeline.send(ApiRequest::get("/events/42")).await.unwrap();
        assert_eq!(response.json_value().unwrap(), json!({"id": 42}));

        let seen = h.transport.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].bearer_token(), Some(AccessToken::new("a1")));
    }

    #[tokio::test]
    async fn no_token_no_header() {
        let h = harness(vec![reply(StatusCode::OK, json!({}))]);
        h.store.clear();

        h.pipeline.send(ApiRequest::get("/events")).await.unwrap();
        assert!(h.transport.seen()[0].bearer_token().is_none());
    }

    #[tokio::test]
    async fn stale_token_refreshes_and_replays_once() {
        let h = harness(vec![
            stale(),
            refreshed("a2", "r2"),
            reply(StatusCode::OK, json!({"id": 42})),
        ]);

        let response = h.pipeline.send(ApiRequest::get("/events/42")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let seen = h.transport.seen();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[1].path(), "/auth/refresh/");
        assert_eq!(seen[2].path(), "/events/42");
        assert_eq!(seen[2].bearer_token(), Some(AccessToken::new("a2")));
        assert!(seen[2].is_retried());

        assert_eq!(h.store.access_token(), Some(AccessToken::new("a2")));
        assert_eq!(h.store.refresh_token(), Some(RefreshToken::new("r2")));
        assert!(h.toasts.is_empty());
    }

    #[tokio::test]
    async fn replay_failure_is_final() {
        let h = harness(vec![stale(), refreshed("a2", "r2"), stale()]);

        let err = h.pipeline.send(ApiRequest::get("/events/42")).await.unwrap_err();
        assert_eq!(err.as_api().map(|e| e.status), Some(401));

        // One refresh, no second replay.
        assert_eq!(h.transport.seen().len(), 3);
        assert_eq!(h.store.access_token(), Some(AccessToken::new("a2")));
        assert!(h.navigator.history().is_empty());
    }

    #[tokio::test]
    async fn refresh_failure_ends_session() {
        let h = harness(vec![
            stale(),
            reply(
                StatusCode::UNAUTHORIZED,
                json!({"detail": "Token is blacklisted", "code": "token_not_valid"}),
            ),
        ]);

        let err = h.pipeline.send(ApiRequest::get("/events/42")).await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::RefreshRejected(_))));

        assert_eq!(h.transport.seen().len(), 2);
        assert!(h.store.access_token().is_none());
        assert!(h.store.refresh_token().is_none());
        assert!(h.store.profile().is_none());

        let toasts = h.toasts.toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, NotificationKind::Error);
        assert_eq!(toasts[0].message, "Session expired. Please log in again.");

        assert_eq!(h.navigator.history(), vec!["/login?redirect=/events/42"]);
    }

    #[tokio::test]
    async fn network_error_never_refreshes() {
        let h = harness(vec![Err(TransportError::Connection {
            message: "connection refused".into(),
        }
        .into())]);

        let err = h.pipeline.send(ApiRequest::get("/events/42")).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(err.user_message(), "Network Error: Unable to reach the server");
        assert_eq!(h.transport.seen().len(), 1);
        assert_eq!(h.store.access_token(), Some(AccessToken::new("a1")));
    }

    #[tokio::test]
    async fn bad_credentials_propagate() {
        let h = harness(vec![reply(
            StatusCode::UNAUTHORIZED,
            json!({"detail": "No active account found with the given credentials"}),
        )]);

        let err = h.pipeline.send(ApiRequest::post("/accounts/auth/login/")).await.unwrap_err();
        let api = err.as_api().unwrap();
        assert_eq!(api.status, 401);
        assert_eq!(api.message, "No active account found with the given credentials");
        assert_eq!(h.transport.seen().len(), 1);
        assert!(h.store.access_token().is_some());
    }

    #[tokio::test]
    async fn forbidden_propagates() {
        let h = harness(vec![reply(
            StatusCode::FORBIDDEN,
            json!({"detail": "You do not have permission to perform this action."}),
        )]);

        let err = h.pipeline.send(ApiRequest::delete("/events/42")).await.unwrap_err();
        assert!(err.as_api().unwrap().is_forbidden());
        assert_eq!(h.transport.seen().len(), 1);
    }

    #[tokio::test]
    async fn reuses_token_refreshed_by_another_request() {
        let h = harness(vec![stale(), reply(StatusCode::OK, json!({}))]);

        // Another request refreshed after this one was sent with a1.
        let mut request = ApiRequest::get("/events/42");
        h.pipeline.before_send(&mut request);
        h.store
            .set_credentials(AccessToken::new("a2"), RefreshToken::new("r2"));

        let outcome = h.transport.execute(&request).await;
        let verdict = h.pipeline.after_receive(&mut request, outcome).await.unwrap();
        assert!(matches!(verdict, Verdict::Replay));
        assert_eq!(request.bearer_token(), Some(AccessToken::new("a2")));

        // No refresh call went out.
        assert_eq!(h.transport.seen().len(), 1);
    }

    #[tokio::test]
    async fn cleared_session_is_not_expired_twice() {
        let h = harness(vec![stale()]);

        let mut request = ApiRequest::get("/events/42");
        h.pipeline.before_send(&mut request);
        h.store.clear();

        let outcome = h.transport.execute(&request).await;
        let err = h.pipeline.after_receive(&mut request, outcome).await.err().unwrap();
        assert!(matches!(err, Error::Auth(AuthError::SessionExpired)));
        assert!(h.toasts.is_empty());
        assert!(h.navigator.history().is_empty());
    }

    #[tokio::test]
    async fn v2_stale_detection_uses_code() {
        let transport = ScriptedTransport::new(vec![
            reply(
                StatusCode::UNAUTHORIZED,
                json!({"error": {"code": "token_expired", "message": "Access token expired"}}),
            ),
            reply(
                StatusCode::OK,
                json!({"data": {"access_token": "a2", "refresh_token": "r2"}}),
            ),
            reply(StatusCode::OK, json!({"data": []})),
        ]);
        let store = SessionStore::in_memory();
        store.set_credentials(AccessToken::new("a1"), RefreshToken::new("r1"));
        let pipeline = Pipeline::new(
            transport.clone(),
            store.clone(),
            BackendKind::V2.variant(),
            Arc::new(ToastQueue::new()),
            Arc::new(MemoryNavigator::default()),
        );

        pipeline
            .send(ApiRequest::get("/api/v2/events/42"))
            .await
            .unwrap();

        let seen = transport.seen();
        assert_eq!(seen[1].path(), "/api/v2/auth/token/refresh");
        assert_eq!(seen[2].bearer_token(), Some(AccessToken::new("a2")));
    }
}
