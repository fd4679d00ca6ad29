//! Terminal implementations of the notification and navigation hooks.

use std::sync::{Mutex, PoisonError};

use colored::Colorize;
use eventdesk::navigation::LOGIN_PATH;
use eventdesk::{Navigator, NotificationKind, Notifier};

/// Prints notifications to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        let title = kind.default_title();
        match kind {
            NotificationKind::Success => eprintln!("{} {}", title.green(), message),
            NotificationKind::Error => eprintln!("{} {}", title.red(), message),
            NotificationKind::Info => eprintln!("{} {}", title.cyan(), message),
        }
    }
}

/// Tracks the page a command stands for and turns forced navigation to the
/// login page into a hint.
#[derive(Debug)]
pub struct TerminalNavigator {
    location: Mutex<String>,
}

impl TerminalNavigator {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: Mutex::new(location.into()),
        }
    }
}

impl Navigator for TerminalNavigator {
    fn current_location(&self) -> String {
        self.location
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn navigate(&self, location: &str) {
        tracing::debug!(%location, "Navigation requested");
        if location.starts_with(LOGIN_PATH) {
            eprintln!(
                "{} Run 'eventdesk auth login' to sign in again ({}).",
                "→".yellow(),
                location
            );
        }
        *self.location.lock().unwrap_or_else(PoisonError::into_inner) = location.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigator_tracks_location() {
        let nav = TerminalNavigator::new("/events/42");
        assert_eq!(nav.current_location(), "/events/42");

        nav.navigate("/login?redirect=/events/42");
        assert_eq!(nav.current_location(), "/login?redirect=/events/42");
    }
}
