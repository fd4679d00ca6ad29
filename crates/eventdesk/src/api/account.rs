//! Sign-in, sign-up and profile endpoints.

use reqwest::Method;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use super::query::{Query, select_data};
use crate::Result;
use crate::auth::Credentials;
use crate::client::ApiClient;
use crate::http::ApiRequest;
use crate::types::{PasswordReset, Registration, UserProfile};

/// POST /accounts/signup/
pub const SIGNUP: &str = "/accounts/signup/";

/// POST /accounts/auth/password/request-token/
pub const REQUEST_RESET_TOKEN: &str = "/accounts/auth/password/request-token/";

/// POST /account/change_password/
pub const CHANGE_PASSWORD: &str = "/account/change_password/";

/// POST /account/reset_password/
pub const RESET_PASSWORD: &str = "/account/reset_password/";

/// POST /account/verify_email/
pub const VERIFY_EMAIL: &str = "/account/verify_email/";

/// POST /account/resend_verification_code/
pub const RESEND_VERIFICATION_CODE: &str = "/account/resend_verification_code/";

/// Cache key of the profile query.
pub const PROFILE_KEY: &str = "userProfile";

/// Account operations of a client.
#[derive(Debug, Clone, Copy)]
pub struct AccountApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AccountApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Log in and store the returned tokens and profile.
    ///
    /// Returns the stored profile.
    ///
    /// # Errors
    ///
    /// Returns an [`crate::Error::Api`] if the backend rejects the
    /// credentials.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: Credentials) -> Result<UserProfile> {
        let variant = self.client.variant();
        let response = self
            .client
            .mutation(Method::POST, variant.login_path())
            .execute(Some(variant.login_body(&credentials)))
            .await?;

        let outcome = variant.parse_login(response.json_value()?)?;
        let session = self.client.session();
        session.set_credentials(outcome.tokens.access, outcome.tokens.refresh);
        session.set_profile(outcome.profile.clone());
        self.client.cache().clear();

        info!("Logged in");
        Ok(session.profile().unwrap_or(outcome.profile))
    }

    /// End the session locally. No request is made.
    pub fn logout(&self) {
        self.client.logout();
    }

    /// Create an account.
    pub async fn register(&self, registration: &Registration) -> Result<Value> {
        self.post(SIGNUP).send(registration).await
    }

    /// Ask for a password reset code by email.
    pub async fn forgot_password(&self, email: &str) -> Result<Value> {
        self.post(REQUEST_RESET_TOKEN)
            .send(&json!({ "email": email }))
            .await
    }

    /// Set a new password using the emailed reset code.
    pub async fn reset_password(&self, otp: &str, reset: &PasswordReset) -> Result<Value> {
        let path = format!("/accounts/auth/password/{}/reset/", otp);
        self.post(&path).send(reset).await
    }

    /// Email the signed-in user a token for changing their password.
    pub async fn send_change_password_email<B: Serialize + ?Sized>(&self, body: &B) -> Result<Value> {
        self.post(CHANGE_PASSWORD).send(body).await
    }

    /// Set a new password with the token from [`AccountApi::send_change_password_email`].
    pub async fn reset_password_with_token<B: Serialize + ?Sized>(&self, body: &B) -> Result<Value> {
        self.post(RESET_PASSWORD).send(body).await
    }

    /// Confirm an email address with the code that was sent to it.
    pub async fn verify_email<B: Serialize + ?Sized>(&self, body: &B) -> Result<Value> {
        self.post(VERIFY_EMAIL).send(body).await
    }

    pub async fn resend_verification_code<B: Serialize + ?Sized>(&self, body: &B) -> Result<Value> {
        self.post(RESEND_VERIFICATION_CODE).send(body).await
    }

    /// Fetch the signed-in user's profile and merge it into the session.
    #[instrument(skip(self))]
    pub async fn fetch_profile(&self) -> Result<UserProfile> {
        let path = self.client.variant().profile_path();
        let body = self.client.send(ApiRequest::get(path)).await?.json_value()?;
        let profile: UserProfile = serde_json::from_value(select_data(body))?;

        let session = self.client.session();
        session.set_profile(profile.clone());
        Ok(session.profile().unwrap_or(profile))
    }

    /// The profile as a cached query. Does not touch the session.
    pub fn profile_query(&self) -> Query<UserProfile> {
        self.client
            .query(self.client.variant().profile_path())
            .key(PROFILE_KEY)
            .select_data(true)
    }

    fn post(&self, path: &str) -> super::Mutation {
        self.client
            .mutation(Method::POST, self.client.resource_path(path))
    }
}
