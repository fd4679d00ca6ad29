//! The legacy REST backend.

use serde::Deserialize;
use serde_json::{Value, json};

use super::{BackendKind, BackendVariant, LoginOutcome, decode};
use crate::Result;
use crate::auth::{Credentials, RefreshToken, TokenPair};
use crate::error::ApiError;
use crate::types::UserProfile;

/// POST /accounts/auth/login/
pub const LOGIN: &str = "/accounts/auth/login/";

/// POST /auth/refresh/
pub const REFRESH: &str = "/auth/refresh/";

/// GET /account/user/basic-info/
pub const PROFILE: &str = "/account/user/basic-info/";

/// Substring of the formatted message the backend uses for expired tokens.
const STALE_TOKEN_MESSAGE: &str = "token not valid";

/// Error code the backend uses for expired tokens.
const STALE_TOKEN_CODE: &str = "token_not_valid";

/// Response from login: tokens and profile share one `data` object.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    data: LoginData,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    access: String,
    refresh: String,
    #[serde(flatten)]
    profile: UserProfile,
}

/// Response from refresh.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
    refresh: String,
}

/// The first-generation backend: flat token fields, message-based expiry detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyBackend;

impl BackendVariant for LegacyBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Legacy
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
        let response: LoginResponse = decode(body, "legacy login response")?;
        Ok(LoginOutcome {
            tokens: TokenPair::new(response.data.access, response.data.refresh),
            profile: response.data.profile,
        })
    }

    fn refresh_path(&self) -> &'static str {
        REFRESH
    }

    fn refresh_body(&self, refresh: &RefreshToken) -> Value {
        json!({ "refreshToken": refresh.as_str() })
    }

    fn parse_refresh(&self, body: Value) -> Result<TokenPair> {
        let response: RefreshResponse = decode(body, "legacy refresh response")?;
        Ok(TokenPair::new(response.access, response.refresh))
    }

    fn profile_path(&self) -> &'static str {
        PROFILE
    }

    fn is_stale_token(&self, error: &ApiError) -> bool {
        error.is_unauthorized()
            && (error.message.contains(STALE_TOKEN_MESSAGE)
                || error.code.as_deref() == Some(STALE_TOKEN_CODE))
    }

    fn resource_prefix(&self) -> &'static str {
        ""
    }
}
