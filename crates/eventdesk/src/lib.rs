//! eventdesk - API client for the events and inventory backend
//!
//! This library provides an authenticated HTTP client with transparent token
//! refresh. All backend calls flow through an [`ApiClient`], which attaches
//! the session's bearer token, refreshes it once when the backend reports it
//! stale, and ends the session when the refresh itself fails.
//!
//! # Example
//!
//! ```no_run
//! use eventdesk::{ApiClient, BackendKind, BaseUrl, ClientConfig, Credentials, FileStorage};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), eventdesk::Error> {
//! let config = ClientConfig::new(BaseUrl::new("https://api.example.com")?)
//!     .with_backend(BackendKind::V2);
//! let client = ApiClient::builder(config)
//!     .storage(Arc::new(FileStorage::in_dir("/tmp/eventdesk")))
//!     .build()?;
//!
//! if !client.session().is_authenticated() {
//!     client
//!         .account()
//!         .login(Credentials::new("ada@example.com", "hunter2"))
//!         .await?;
//! }
//!
//! if let Some(codes) = client.discount_codes().for_event(42, true).mount().await? {
//!     for code in codes {
//!         println!("{}: {} uses", code.code, code.uses());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod navigation;
pub mod notify;
pub mod types;

// Re-export primary types at crate root for convenience
pub use api::{Mutation, Query, QueryCache, QueryKey, RefetchOnMount};
pub use auth::{
    AccessToken, Credentials, FileStorage, MemoryStorage, RefreshToken, SessionStorage,
    SessionStore, TokenPair, TokenRefresher,
};
pub use backend::{BackendKind, BackendVariant};
pub use client::{ApiClient, ApiClientBuilder};
pub use config::ClientConfig;
pub use error::Error;
pub use guard::{GuardDecision, Route, RouteGuard};
pub use http::{ApiRequest, ApiResponse, Transport};
pub use navigation::Navigator;
pub use notify::{NotificationKind, Notifier, ToastQueue};
pub use types::{BaseUrl, UserProfile};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
