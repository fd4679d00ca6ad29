//! Exchanging the refresh token for a new token pair.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::store::SessionStore;
use super::tokens::AccessToken;
use crate::Result;
use crate::backend::BackendVariant;
use crate::error::AuthError;
use crate::http::{ApiRequest, Transport};

/// Runs the refresh exchange against the active backend.
///
/// The exchange goes straight to the [`Transport`], never through the
/// request pipeline, so a rejected refresh can not trigger another refresh.
#[derive(Clone)]
pub struct TokenRefresher {
    transport: Arc<dyn Transport>,
    store: SessionStore,
    variant: Arc<dyn BackendVariant>,
}

impl TokenRefresher {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: SessionStore,
        variant: Arc<dyn BackendVariant>,
    ) -> Self {
        Self {
            transport,
            store,
            variant,
        }
    }

    /// Exchange the stored refresh token, store the new pair and return the
    /// new access token.
    ///
    /// Makes exactly one request. A non-success status is reported as
    /// [`AuthError::RefreshRejected`]; the store is left untouched on any
    /// failure.
    #[instrument(skip(self), fields(backend = %self.variant.kind()))]
    pub async fn refresh(&self) -> Result<AccessToken> {
        let refresh = self
            .store
            .refresh_token()
            .ok_or(AuthError::RefreshTokenMissing)?;

        let request = ApiRequest::post(self.variant.refresh_path())
            .with_json(self.variant.refresh_body(&refresh));

        debug!(path = self.variant.refresh_path(), "Refreshing access token");
        let response = self.transport.execute(&request).await?;

        if !response.status().is_success() {
            let error = response.into_error();
            warn!(status = error.status, "Refresh rejected");
            return Err(AuthError::RefreshRejected(error).into());
        }

        let pair = self.variant.parse_refresh(response.json_value()?)?;
        let access = pair.access.clone();
        self.store.set_credentials(pair.access, pair.refresh);

        info!("Access token refreshed");
        Ok(access)
    }
}

impl std::fmt::Debug for TokenRefresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRefresher")
            .field("backend", &self.variant.kind())
            .finish()
    }
}
