//! Error types for the eventdesk client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, API, storage and input validation errors.

use std::fmt;
use thiserror::Error;

use crate::http::error_body;

/// The unified error type for eventdesk operations.
///
/// Network failures ([`Error::Transport`]) are kept apart from responses the
/// server actually produced ([`Error::Api`]) so the request pipeline can tell
/// "no response" from "rejected".
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (missing credentials, rejected refresh).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The backend answered with a non-success status.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Input validation errors (bad URL, unknown backend, undecodable body).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Session persistence errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// Human-readable message suitable for a notification.
    pub fn user_message(&self) -> String {
        match self {
            Error::Transport(_) => error_body::NETWORK_ERROR_MESSAGE.to_string(),
            Error::Api(err) => err.message.clone(),
            Error::Auth(AuthError::SessionExpired) | Error::Auth(AuthError::RefreshRejected(_)) => {
                crate::http::SESSION_EXPIRED_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }

    /// Returns the API error if the server produced a response.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(TransportError::from(err))
    }
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// There is no refresh token to exchange.
    #[error("no refresh token available")]
    RefreshTokenMissing,

    /// The refresh endpoint rejected the refresh token.
    #[error("refresh rejected: {0}")]
    RefreshRejected(ApiError),

    /// The session was already cleared by a failed refresh.
    #[error("session expired")]
    SessionExpired,

    /// An operation needs a session and none is stored.
    #[error("not authenticated")]
    NotAuthenticated,
}

/// A non-success response from the backend.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Machine-readable error code (if present).
    pub code: Option<String>,
    /// Formatted, user-facing message.
    pub message: String,
    /// Raw JSON body, when the response carried one.
    pub body: Option<serde_json::Value>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref code) = self.code {
            write!(f, " [{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Build an error from a status code and a raw response body.
    pub fn from_body(status: u16, raw: &[u8]) -> Self {
        let body = serde_json::from_slice::<serde_json::Value>(raw).ok();
        let code = body.as_ref().and_then(error_body::error_code);
        let message = error_body::format_error(body.as_ref());
        Self {
            status,
            code,
            message,
            body,
        }
    }

    /// Check if the server answered 401.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Check if the server answered 403.
    pub fn is_forbidden(&self) -> bool {
        self.status == 403
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid base URL '{value}': {reason}")]
    BaseUrl { value: String, reason: String },

    /// Unknown backend variant name.
    #[error("unknown backend '{value}' (expected 'legacy' or 'v2')")]
    Backend { value: String },

    /// A response body did not have the expected shape.
    #[error("unexpected response body: {message}")]
    Decode { message: String },

    /// A multipart form could not be built.
    #[error("invalid form: {message}")]
    Form { message: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidInput(InvalidInputError::Decode {
            message: err.to_string(),
        })
    }
}

/// Session persistence errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem error.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The persisted session could not be encoded or decoded.
    #[error("invalid session data: {message}")]
    Format { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_status_and_code() {
        let err = ApiError::from_body(
            401,
            br#"{"detail": "Given token not valid for any token type", "code": "token_not_valid"}"#,
        );
        let text = err.to_string();
        assert!(text.contains("401"));
        assert!(text.contains("token_not_valid"));
        assert!(err.is_unauthorized());
    }

    #[test]
    fn api_error_from_non_json_body() {
        let err = ApiError::from_body(500, b"Internal Server Error");
        assert!(err.body.is_none());
        assert!(err.code.is_none());
        assert_eq!(err.message, "Oops! Something went wrong.");
    }

    #[test]
    fn transport_error_has_network_user_message() {
        let err = Error::Transport(TransportError::Timeout);
        assert_eq!(
            err.user_message(),
            "Network Error: Unable to reach the server"
        );
    }
}
