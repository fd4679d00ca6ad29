//! Navigation gating based on the session.

use std::sync::Arc;

use tracing::debug;

use crate::auth::SessionStore;
use crate::http::Params;
use crate::navigation::login_redirect;
use crate::notify::{NotificationKind, Notifier};

/// Pages that belong to the sign-in flow.
pub const AUTH_PAGES: &[&str] = &[
    "/login",
    "/signup",
    "/forgot-password",
    "/reset-password",
    "/confirm-email",
];

pub const DASHBOARD_PATH: &str = "/dashboard";
pub const CONFIRM_EMAIL_PATH: &str = "/confirm-email";
pub const ADD_BANK_PATH: &str = "/add-bank";
const SIGNUP_PATH: &str = "/signup";

pub const CONFIRM_EMAIL_NOTICE: &str = "Please confirm your email to continue.";
pub const ADD_BANK_NOTICE: &str = "Please add a bank account to receive payments.";
pub const ACTIVE_SESSION_NOTICE: &str = "You already have an active session.";

/// A navigation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub query: Params,
    pub requires_auth: bool,
}

impl Route {
    /// A public route.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Params::new(),
            requires_auth: false,
        }
    }

    /// A route only logged-in users may visit.
    pub fn protected(path: impl Into<String>) -> Self {
        Self {
            requires_auth: true,
            ..Self::new(path)
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Path plus query string, percent-encoded like [`login_redirect`].
    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        format!("{}?{}", self.path, query.join("&"))
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(String),
}

/// Decides whether a navigation may happen, reading only the session's
/// authentication state and the profile's onboarding flags.
#[derive(Clone)]
pub struct RouteGuard {
    store: SessionStore,
    notifier: Arc<dyn Notifier>,
}

impl RouteGuard {
    pub fn new(store: SessionStore, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Check a navigation from `from` to `to`.
    pub fn check(&self, to: &Route, from: &Route) -> GuardDecision {
        if from.path == SIGNUP_PATH && to.path == CONFIRM_EMAIL_PATH {
            return GuardDecision::Proceed;
        }

        // Already there; redirecting again would loop.
        if to.path == from.path {
            return GuardDecision::Proceed;
        }

        let snapshot = self.store.snapshot();
        let authenticated = snapshot.is_authenticated();

        if let (true, Some(profile)) = (authenticated, snapshot.profile.as_ref()) {
            let confirmed = profile.is_email_confirmed();

            if !confirmed && !to.path.contains(CONFIRM_EMAIL_PATH) {
                self.notice(CONFIRM_EMAIL_NOTICE);
                let mut target = Route::new(CONFIRM_EMAIL_PATH);
                if let Some(email) = &profile.email {
                    target = target.with_query("email", email.clone());
                }
                return self.redirect(target.full_path());
            }

            if confirmed && !profile.has_payment_account() && !to.path.contains(ADD_BANK_PATH) {
                self.notice(ADD_BANK_NOTICE);
                return self.redirect(ADD_BANK_PATH.to_string());
            }

            if is_auth_page(&to.path)
                && !to.path.contains(CONFIRM_EMAIL_PATH)
                && !to.path.contains(ADD_BANK_PATH)
            {
                self.notice(ACTIVE_SESSION_NOTICE);
                return self.redirect(DASHBOARD_PATH.to_string());
            }
        }

        if !authenticated && to.requires_auth {
            return self.redirect(login_redirect(&to.full_path()));
        }

        GuardDecision::Proceed
    }

    fn notice(&self, message: &str) {
        self.notifier.notify(NotificationKind::Info, message);
    }

    fn redirect(&self, target: String) -> GuardDecision {
        debug!(%target, "Navigation redirected");
        GuardDecision::Redirect(target)
    }
}

impl std::fmt::Debug for RouteGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteGuard")
            .field("store", &self.store)
            .finish()
    }
}

fn is_auth_page(path: &str) -> bool {
    AUTH_PAGES.contains(&path)
}
