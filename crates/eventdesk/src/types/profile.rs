//! Authenticated user profile.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile of the authenticated principal.
///
/// Every field is optional so a partial update (for example the response of a
/// profile fetch that omits the avatar) can be merged into the stored profile
/// with [`UserProfile::merge`]. Fields the client does not model are kept in
/// `extra` and survive persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,

    /// Whether the email address has been confirmed.
    #[serde(
        default,
        alias = "is_email_verified",
        skip_serializing_if = "Option::is_none"
    )]
    pub email_confirmed: Option<bool>,

    /// Whether a payout bank account is on file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_payment_account: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Overlay `update` onto this profile.
    ///
    /// Present fields overwrite, absent fields keep their current value and
    /// extra fields are unioned (the update wins on key collisions).
    pub fn merge(&mut self, update: UserProfile) {
        let UserProfile {
            first_name,
            last_name,
            email,
            avatar_url,
            email_confirmed,
            has_payment_account,
            extra,
        } = update;

        overlay(&mut self.first_name, first_name);
        overlay(&mut self.last_name, last_name);
        overlay(&mut self.email, email);
        overlay(&mut self.avatar_url, avatar_url);
        overlay(&mut self.email_confirmed, email_confirmed);
        overlay(&mut self.has_payment_account, has_payment_account);
        self.extra.extend(extra);
    }

    /// Display name, falling back to the email address.
    pub fn display_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(first), None) => Some(first.clone()),
            (None, Some(last)) => Some(last.clone()),
            (None, None) => self.email.clone(),
        }
    }

    /// True once the email address is confirmed.
    pub fn is_email_confirmed(&self) -> bool {
        self.email_confirmed.unwrap_or(false)
    }

    /// True once a payout account is on file.
    pub fn has_payment_account(&self) -> bool {
        self.has_payment_account.unwrap_or(false)
    }
}

fn overlay<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}
