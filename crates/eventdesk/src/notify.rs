//! User-facing notifications.
//!
//! The pipeline and the route guard report things the user should see
//! ("Session expired", "Please confirm your email") through a [`Notifier`].
//! Rendering is left to the embedding application; [`ToastQueue`] keeps the
//! notifications as data, [`TracingNotifier`] just logs them.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// How long a toast stays up unless told otherwise.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(5000);

/// Errors stay up longer.
pub const ERROR_DURATION: Duration = Duration::from_millis(7000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    /// Title used when the caller gives none.
    pub fn default_title(self) -> &'static str {
        match self {
            NotificationKind::Success => "Success!",
            NotificationKind::Error => "Failed!",
            NotificationKind::Info => "Info!",
        }
    }

    pub fn default_duration(self) -> Duration {
        match self {
            NotificationKind::Error => ERROR_DURATION,
            _ => DEFAULT_DURATION,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        })
    }
}

/// Fire-and-forget sink for user-facing messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str);
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Error => warn!(%kind, "{}", message),
            _ => info!(%kind, "{}", message),
        }
    }
}

/// Per-toast overrides.
#[derive(Debug, Clone, Default)]
pub struct ToastOptions {
    pub title: Option<String>,
    pub duration: Option<Duration>,
    pub persistent: bool,
}

/// One queued notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub duration: Duration,
    pub persistent: bool,
    pub created_at: DateTime<Utc>,
}

impl Toast {
    /// True once a non-persistent toast has outlived its duration.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        if self.persistent || self.duration.is_zero() {
            return false;
        }
        match chrono::Duration::from_std(self.duration) {
            Ok(duration) => self.created_at + duration <= now,
            Err(_) => false,
        }
    }
}

/// In-memory toast list, oldest first.
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Mutex<Vec<Toast>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a toast and return its id.
    pub fn push(&self, kind: NotificationKind, message: &str, options: ToastOptions) -> String {
        let toast = Toast {
            id: next_id(),
            kind,
            title: options
                .title
                .unwrap_or_else(|| kind.default_title().to_string()),
            message: message.to_string(),
            duration: options.duration.unwrap_or(kind.default_duration()),
            persistent: options.persistent,
            created_at: Utc::now(),
        };
        let id = toast.id.clone();
        self.lock().push(toast);
        id
    }

    pub fn success(&self, message: &str) -> String {
        self.push(NotificationKind::Success, message, ToastOptions::default())
    }

    pub fn error(&self, message: &str) -> String {
        self.push(NotificationKind::Error, message, ToastOptions::default())
    }

    pub fn info(&self, message: &str) -> String {
        self.push(NotificationKind::Info, message, ToastOptions::default())
    }

    /// Remove a toast by id. Returns false if it was not queued.
    pub fn remove(&self, id: &str) -> bool {
        let mut toasts = self.lock();
        match toasts.iter().position(|t| t.id == id) {
            Some(index) => {
                toasts.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// A copy of the queued toasts.
    pub fn toasts(&self) -> Vec<Toast> {
        self.lock().clone()
    }

    /// Take every queued toast.
    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut *self.lock())
    }

    /// Drop toasts whose time is up at `now`, returning how many were dropped.
    pub fn prune_expired(&self, now: DateTime<Utc>) -> usize {
        let mut toasts = self.lock();
        let before = toasts.len();
        toasts.retain(|t| !t.is_expired(now));
        before - toasts.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Toast>> {
        self.toasts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.push(kind, message, ToastOptions::default());
    }
}

fn next_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("toast-{}-{}", Utc::now().timestamp_millis(), &suffix[..9])
}
