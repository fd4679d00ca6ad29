//! Navigation collaborator.
//!
//! The client never renders pages, but a failed token refresh must send the
//! user back to the login page with a way to return. A [`Navigator`] is the
//! narrow interface the pipeline and the route guard use for that.

use std::sync::{Mutex, PoisonError};

/// Path of the login entry point.
pub const LOGIN_PATH: &str = "/login";

/// Reads and changes the current location.
pub trait Navigator: Send + Sync {
    /// Full path (with query) of the current location.
    fn current_location(&self) -> String;

    /// Move to `location`.
    fn navigate(&self, location: &str);
}

/// The login location that returns to `return_to` afterwards.
///
/// `return_to` is percent-encoded as a URI component: a space becomes `%20`,
/// never `+`, so a plain percent-decode gets the path back. `/` is the one
/// character left unescaped so the path stays readable.
///
/// ```
/// use eventdesk::navigation::login_redirect;
///
/// assert_eq!(login_redirect("/events/42"), "/login?redirect=/events/42");
/// assert_eq!(
///     login_redirect("/events?page=2"),
///     "/login?redirect=/events%3Fpage%3D2"
/// );
/// assert_eq!(
///     login_redirect("/events?q=night market"),
///     "/login?redirect=/events%3Fq%3Dnight%20market"
/// );
/// ```
pub fn login_redirect(return_to: &str) -> String {
    let encoded = urlencoding::encode(return_to);
    format!("{}?redirect={}", LOGIN_PATH, encoded.replace("%2F", "/"))
}

/// A navigator that only remembers where it has been sent.
#[derive(Debug)]
pub struct MemoryNavigator {
    state: Mutex<NavState>,
}

#[derive(Debug)]
struct NavState {
    location: String,
    history: Vec<String>,
}

impl MemoryNavigator {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(NavState {
                location: location.into(),
                history: Vec::new(),
            }),
        }
    }

    /// Every location passed to [`Navigator::navigate`], oldest first.
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NavState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_location(&self) -> String {
        self.lock().location.clone()
    }

    fn navigate(&self, location: &str) {
        let mut state = self.lock();
        state.location = location.to_string();
        state.history.push(location.to_string());
    }
}
