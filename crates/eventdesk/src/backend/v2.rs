//! The v2 REST backend.

use serde::Deserialize;
use serde_json::{Value, json};

use super::{BackendKind, BackendVariant, LoginOutcome, decode};
use crate::Result;
use crate::auth::{Credentials, RefreshToken, TokenPair};
use crate::error::ApiError;
use crate::types::UserProfile;

/// POST /api/v2/auth/login
pub const LOGIN: &str = "/api/v2/auth/login";

/// POST /api/v2/auth/token/refresh
pub const REFRESH: &str = "/api/v2/auth/token/refresh";

/// GET /api/v2/account/me
pub const PROFILE: &str = "/api/v2/account/me";

/// Error code the v2 backend uses for expired access tokens.
const STALE_TOKEN_CODE: &str = "token_expired";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct Tokens {
    access_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    tokens: Tokens,
    user: UserProfile,
}

/// The v2 backend: enveloped responses, snake_case token fields and
/// code-based expiry detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct V2Backend;

impl BackendVariant for V2Backend {
    fn kind(&self) -> BackendKind {
        BackendKind::V2
    }

    fn login_path(&self) -> &'static str {
        LOGIN
    }

    fn login_body(&self, credentials: &Credentials) -> Value {
        json!({
            "email": credentials.email(),
            "password": credentials.password(),
        })
    }

    fn parse_login(&self, body: Value) -> Result<LoginOutcome> {
        let response: Envelope<LoginData> = decode(body, "v2 login response")?;
        let LoginData { tokens, user } = response.data;
        Ok(LoginOutcome {
            tokens: TokenPair::new(tokens.access_token, tokens.refresh_token),
            profile: user,
        })
    }

    fn refresh_path(&self) -> &'static str {
        REFRESH
    }

    fn refresh_body(&self, refresh: &RefreshToken) -> Value {
        json!({ "refresh_token": refresh.as_str() })
    }

    fn parse_refresh(&self, body: Value) -> Result<TokenPair> {
        let response: Envelope<Tokens> = decode(body, "v2 refresh response")?;
        Ok(TokenPair::new(
            response.data.access_token,
            response.data.refresh_token,
        ))
    }

    fn profile_path(&self) -> &'static str {
        PROFILE
    }

    fn is_stale_token(&self, error: &ApiError) -> bool {
        error.is_unauthorized() && error.code.as_deref() == Some(STALE_TOKEN_CODE)
    }

    fn resource_prefix(&self) -> &'static str {
        "/api/v2"
    }
}
