//! Durable storage for the session triple.
//!
//! The session store writes the (profile, access token, refresh token) triple
//! through a [`SessionStorage`] after every mutation, and reads it back once
//! when a client starts.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::Result;
use crate::error::StorageError;
use crate::types::UserProfile;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Fixed namespace the session is stored under.
pub const STORAGE_NAMESPACE: &str = "auth";

/// The persisted session triple.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl PersistedSession {
    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.access_token.is_none() && self.refresh_token.is_none()
    }
}

impl fmt::Debug for PersistedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedSession")
            .field("user", &self.user)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Durable key-value storage for the session.
pub trait SessionStorage: Send + Sync {
    /// Load the stored session, if any.
    fn load(&self) -> Result<Option<PersistedSession>>;

    /// Replace the stored session.
    fn save(&self, session: &PersistedSession) -> Result<()>;
}

/// Storage that keeps the session in memory only.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<PersistedSession>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already persisted session.
    pub fn with_session(session: PersistedSession) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }

    /// The last saved session.
    pub fn snapshot(&self) -> Option<PersistedSession> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<PersistedSession>> {
        Ok(self.snapshot())
    }

    fn save(&self, session: &PersistedSession) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }
}

/// Storage backed by a JSON file named after [`STORAGE_NAMESPACE`].
///
/// Writes take an exclusive file lock and the file is readable by the owner
/// only on unix.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Store the session in `<dir>/auth.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", STORAGE_NAMESPACE)),
        }
    }

    /// Returns the session file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl SessionStorage for FileStorage {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Option<PersistedSession>> {
        if !self.path.exists() {
            debug!("No stored session");
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let stored = serde_json::from_str(&json).map_err(|e| StorageError::Format {
            message: e.to_string(),
        })?;

        Ok(Some(stored))
    }

    #[instrument(skip(self, session), fields(path = %self.path.display()))]
    fn save(&self, session: &PersistedSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(session).map_err(|e| StorageError::Format {
            message: e.to_string(),
        })?;

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;

        file.lock_exclusive().map_err(|e| self.io_error(e))?;
        file.set_len(0).map_err(|e| self.io_error(e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| self.io_error(e))?;
        file.sync_data().map_err(|e| self.io_error(e))?;
        FileExt::unlock(&file).map_err(|e| self.io_error(e))?;

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&self.path)
                .map_err(|e| self.io_error(e))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms).map_err(|e| self.io_error(e))?;
        }

        debug!("Session saved");
        Ok(())
    }
}
