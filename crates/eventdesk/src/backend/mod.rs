//! Backend variant abstraction.
//!
//! The dashboard talks to one of two REST backends that disagree on auth
//! endpoint paths, token field names and how an expired access token is
//! reported. A [`BackendVariant`] captures one backend's shape and is injected
//! into the request pipeline and the refresh procedure at construction time.

mod legacy;
mod v2;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;
use crate::auth::{Credentials, RefreshToken, TokenPair};
use crate::error::{ApiError, Error, InvalidInputError};
use crate::types::UserProfile;

pub use legacy::LegacyBackend;
pub use v2::V2Backend;

/// Which backend the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Legacy,
    V2,
}

impl BackendKind {
    /// The variant implementation for this kind.
    pub fn variant(self) -> Arc<dyn BackendVariant> {
        match self {
            BackendKind::Legacy => Arc::new(LegacyBackend),
            BackendKind::V2 => Arc::new(V2Backend),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Legacy => "legacy",
            BackendKind::V2 => "v2",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" | "v1" => Ok(BackendKind::Legacy),
            "v2" => Ok(BackendKind::V2),
            _ => Err(InvalidInputError::Backend {
                value: s.to_string(),
            }
            .into()),
        }
    }
}

/// Tokens and profile returned by a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub tokens: TokenPair,
    pub profile: UserProfile,
}

/// The shape of one backend's authentication API.
pub trait BackendVariant: Send + Sync + fmt::Debug {
    /// Which backend this is.
    fn kind(&self) -> BackendKind;

    /// Path of the login endpoint (POST).
    fn login_path(&self) -> &'static str;

    /// Request body for a login.
    fn login_body(&self, credentials: &Credentials) -> Value;

    /// Decode a successful login response.
    fn parse_login(&self, body: Value) -> Result<LoginOutcome>;

    /// Path of the refresh endpoint (POST).
    fn refresh_path(&self) -> &'static str;

    /// Request body carrying the refresh token.
    fn refresh_body(&self, refresh: &RefreshToken) -> Value;

    /// Decode a successful refresh response.
    fn parse_refresh(&self, body: Value) -> Result<TokenPair>;

    /// Path of the authenticated user's profile (GET).
    fn profile_path(&self) -> &'static str;

    /// True if `error` means the access token itself is no longer valid, as
    /// opposed to bad credentials or missing permissions.
    fn is_stale_token(&self, error: &ApiError) -> bool;

    /// Prefix for resource endpoints (events, discount codes, locations).
    fn resource_prefix(&self) -> &'static str;

    /// Full path of a resource endpoint.
    fn resource_path(&self, path: &str) -> String {
        format!("{}{}", self.resource_prefix(), path)
    }
}

/// Decode a response body, reporting shape mismatches as input errors.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(body: Value, what: &str) -> Result<T> {
    serde_json::from_value(body).map_err(|e| {
        InvalidInputError::Decode {
            message: format!("{}: {}", what, e),
        }
        .into()
    })
}
