//! Authentication types and session management.
//!
//! The [`SessionStore`] is the single owner of the token pair and the user
//! profile. The request pipeline reads tokens from it and the
//! [`TokenRefresher`] writes refreshed pairs back.

mod credentials;
mod refresh;
mod storage;
mod store;
mod tokens;

pub use credentials::Credentials;
pub use refresh::TokenRefresher;
pub use storage::{FileStorage, MemoryStorage, PersistedSession, STORAGE_NAMESPACE, SessionStorage};
pub use store::{SessionSnapshot, SessionStore};
pub use tokens::{AccessToken, RefreshToken, TokenPair};
