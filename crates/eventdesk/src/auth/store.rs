//! The session store: single source of truth for credentials and profile.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use super::storage::{MemoryStorage, PersistedSession, SessionStorage};
use super::tokens::{AccessToken, RefreshToken, TokenPair};
use crate::types::UserProfile;

/// Holds the current token pair and the authenticated user's profile.
///
/// Handles are cheap to clone and all share one session. Every operation is
/// total: mutations are applied in memory and then written through the
/// configured [`SessionStorage`]; a failed write is logged and does not undo
/// the mutation.
///
/// Tokens are stored as a [`TokenPair`], so an access token can never be
/// present without its refresh token.
///
/// # Example
///
/// ```
/// use eventdesk::{AccessToken, RefreshToken, SessionStore, UserProfile};
///
/// let store = SessionStore::in_memory();
/// store.set_credentials(AccessToken::new("a1"), RefreshToken::new("r1"));
/// assert!(!store.is_authenticated());
///
/// store.set_profile(UserProfile::default());
/// assert!(store.is_authenticated());
///
/// store.clear();
/// assert!(store.access_token().is_none());
/// ```
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: RwLock<SessionSnapshot>,
    storage: Arc<dyn SessionStorage>,
}

/// A point-in-time copy of the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub tokens: Option<TokenPair>,
    pub profile: Option<UserProfile>,
}

impl SessionSnapshot {
    /// True iff an access token and a profile are both present.
    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_some() && self.profile.is_some()
    }

    fn to_persisted(&self) -> PersistedSession {
        PersistedSession {
            user: self.profile.clone(),
            access_token: self.tokens.as_ref().map(|t| t.access.as_str().to_string()),
            refresh_token: self.tokens.as_ref().map(|t| t.refresh.as_str().to_string()),
        }
    }

    fn from_persisted(stored: PersistedSession) -> Self {
        let tokens = match (stored.access_token, stored.refresh_token) {
            (Some(access), Some(refresh)) => Some(TokenPair::new(access, refresh)),
            (None, None) => None,
            _ => {
                warn!("Stored session has only one of its two tokens; discarding both");
                None
            }
        };

        Self {
            tokens,
            profile: stored.user,
        }
    }
}

impl SessionStore {
    /// An empty session written through `storage`. Nothing is loaded.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self::with_state(storage, SessionSnapshot::default())
    }

    /// A session restored from whatever `storage` holds.
    ///
    /// Unreadable storage is logged and yields an empty session.
    pub fn restore(storage: Arc<dyn SessionStorage>) -> Self {
        let state = match storage.load() {
            Ok(Some(stored)) => {
                debug!("Restored persisted session");
                SessionSnapshot::from_persisted(stored)
            }
            Ok(None) => SessionSnapshot::default(),
            Err(e) => {
                warn!(error = %e, "Failed to load persisted session, starting empty");
                SessionSnapshot::default()
            }
        };

        Self::with_state(storage, state)
    }

    /// An empty session that is never written to disk.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    fn with_state(storage: Arc<dyn SessionStorage>, state: SessionSnapshot) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(state),
                storage,
            }),
        }
    }

    /// Replace both tokens at once.
    pub fn set_credentials(&self, access: AccessToken, refresh: RefreshToken) {
        self.mutate(|state| {
            state.tokens = Some(TokenPair { access, refresh });
        });
    }

    /// Merge `profile` into the stored profile, or store it if there is none.
    ///
    /// See [`UserProfile::merge`] for the merge rules.
    pub fn set_profile(&self, profile: UserProfile) {
        self.mutate(|state| match state.profile.as_mut() {
            Some(existing) => existing.merge(profile),
            None => state.profile = Some(profile),
        });
    }

    /// Remove both tokens and the profile. Calling it again is a no-op.
    pub fn clear(&self) {
        self.mutate(|state| {
            state.tokens = None;
            state.profile = None;
        });
    }

    /// True iff an access token and a profile are both present.
    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    /// The current access token.
    pub fn access_token(&self) -> Option<AccessToken> {
        self.read().tokens.as_ref().map(|t| t.access.clone())
    }

    /// The current refresh token.
    pub fn refresh_token(&self) -> Option<RefreshToken> {
        self.read().tokens.as_ref().map(|t| t.refresh.clone())
    }

    /// The current profile.
    pub fn profile(&self) -> Option<UserProfile> {
        self.read().profile.clone()
    }

    /// A copy of the whole session.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionSnapshot> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionSnapshot> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // Persist while still holding the write lock so saves land in mutation order.
    fn mutate(&self, apply: impl FnOnce(&mut SessionSnapshot)) {
        let mut state = self.write();
        apply(&mut state);

        if let Err(e) = self.inner.storage.save(&state.to_persisted()) {
            warn!(error = %e, "Failed to persist session");
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("SessionStore")
            .field("authenticated", &state.is_authenticated())
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;

    fn profile() -> UserProfile {
        UserProfile {
            first_name: Some("Ada".into()),
            email: Some("ada@example.com".into()),
            email_confirmed: Some(true),
            ..Default::default()
        }
    }

    #[test]
    fn starts_empty() {
        let store = SessionStore::in_memory();
        assert!(!store.is_authenticated());
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
        assert!(store.profile().is_none());
    }

    #[test]
    fn authenticated_needs_token_and_profile() {
        let store = SessionStore::in_memory();
        store.set_profile(profile());
        assert!(!store.is_authenticated());

        store.set_credentials(AccessToken::new("a1"), RefreshToken::new("r1"));
        assert!(store.is_authenticated());
    }

    #[test]
    fn set_credentials_replaces_both() {
        let store = SessionStore::in_memory();
        store.set_credentials(AccessToken::new("a1"), RefreshToken::new("r1"));
        store.set_credentials(AccessToken::new("a2"), RefreshToken::new("r2"));

        assert_eq!(store.access_token(), Some(AccessToken::new("a2")));
        assert_eq!(store.refresh_token(), Some(RefreshToken::new("r2")));
    }

    #[test]
    fn set_profile_merges() {
        let store = SessionStore::in_memory();
        store.set_profile(profile());
        store.set_profile(UserProfile {
            has_payment_account: Some(true),
            ..Default::default()
        });

        let merged = store.profile().unwrap();
        assert_eq!(merged.first_name.as_deref(), Some("Ada"));
        assert!(merged.has_payment_account());
    }

    #[test]
    fn clear_is_idempotent() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone());
        store.set_credentials(AccessToken::new("a1"), RefreshToken::new("r1"));
        store.set_profile(profile());

        store.clear();
        let once = store.snapshot();
        let persisted_once = storage.snapshot();

        store.clear();
        assert_eq!(store.snapshot(), once);
        assert_eq!(storage.snapshot(), persisted_once);
        assert_eq!(once, SessionSnapshot::default());
        assert!(storage.snapshot().unwrap().is_empty());
    }

    #[test]
    fn every_mutation_is_persisted() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone());

        store.set_credentials(AccessToken::new("a1"), RefreshToken::new("r1"));
        let saved = storage.snapshot().unwrap();
        assert_eq!(saved.access_token.as_deref(), Some("a1"));
        assert_eq!(saved.refresh_token.as_deref(), Some("r1"));
        assert!(saved.user.is_none());

        store.set_profile(profile());
        assert_eq!(storage.snapshot().unwrap().user, Some(profile()));
    }

    #[test]
    fn restore_reads_the_triple() {
        let storage = Arc::new(MemoryStorage::with_session(PersistedSession {
            user: Some(profile()),
            access_token: Some("a1".into()),
            refresh_token: Some("r1".into()),
        }));

        let store = SessionStore::restore(storage);
        assert!(store.is_authenticated());
        assert_eq!(store.access_token(), Some(AccessToken::new("a1")));
        assert_eq!(store.profile(), Some(profile()));
    }

    #[test]
    fn restore_discards_half_a_pair() {
        let storage = Arc::new(MemoryStorage::with_session(PersistedSession {
            user: Some(profile()),
            access_token: Some("a1".into()),
            refresh_token: None,
        }));

        let store = SessionStore::restore(storage);
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
        assert!(store.profile().is_some());
    }

    struct FailingStorage;

    impl SessionStorage for FailingStorage {
        fn load(&self) -> Result<Option<PersistedSession>> {
            Err(crate::error::StorageError::Format {
                message: "broken".into(),
            }
            .into())
        }

        fn save(&self, _session: &PersistedSession) -> Result<()> {
            Err(crate::error::StorageError::Format {
                message: "broken".into(),
            }
            .into())
        }
    }

    #[test]
    fn storage_failures_do_not_surface() {
        let store = SessionStore::restore(Arc::new(FailingStorage));
        assert!(!store.is_authenticated());

        store.set_credentials(AccessToken::new("a1"), RefreshToken::new("r1"));
        assert_eq!(store.access_token(), Some(AccessToken::new("a1")));
    }

    #[test]
    fn clones_share_state() {
        let store = SessionStore::in_memory();
        let other = store.clone();
        store.set_credentials(AccessToken::new("a1"), RefreshToken::new("r1"));
        assert_eq!(other.access_token(), Some(AccessToken::new("a1")));
    }
}
