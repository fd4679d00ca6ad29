//! Client configuration.

use std::time::Duration;

use crate::Result;
use crate::backend::BackendKind;
use crate::error::InvalidInputError;
use crate::types::BaseUrl;

/// Environment variable holding the backend base URL.
pub const API_URL_ENV: &str = "EVENTDESK_API_URL";

/// Environment variable selecting the backend variant (`legacy` or `v2`).
pub const BACKEND_ENV: &str = "EVENTDESK_BACKEND";

/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "EVENTDESK_TIMEOUT_SECS";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how the client talks to the backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: BaseUrl,
    pub backend: BackendKind,
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl ClientConfig {
    /// Legacy backend at `base_url` with default timeout and user agent.
    pub fn new(base_url: BaseUrl) -> Self {
        Self {
            base_url,
            backend: BackendKind::default(),
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent: concat!("eventdesk/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Set the per-request timeout; `None` disables it.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let url = lookup(API_URL_ENV).ok_or_else(|| InvalidInputError::Other {
            message: format!("{} is not set", API_URL_ENV),
        })?;
        let mut config = Self::new(BaseUrl::new(url)?);

        if let Some(backend) = lookup(BACKEND_ENV) {
            config.backend = backend.parse()?;
        }

        if let Some(secs) = lookup(TIMEOUT_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|_| InvalidInputError::Other {
                message: format!("{} must be a whole number of seconds, got {:?}", TIMEOUT_ENV, secs),
            })?;
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ClientConfig::new(BaseUrl::new("https://api.example.com").unwrap());
        assert_eq!(config.backend, BackendKind::Legacy);
        assert_eq!(config.timeout, Some(DEFAULT_TIMEOUT));
        assert!(config.user_agent.starts_with("eventdesk/"));
    }

    #[test]
    fn reads_all_variables() {
        let config = ClientConfig::from_lookup(env(&[
            (API_URL_ENV, "https://api.example.com"),
            (BACKEND_ENV, "v2"),
            (TIMEOUT_ENV, "5"),
        ]))
        .unwrap();

        assert_eq!(config.base_url.host(), Some("api.example.com"));
        assert_eq!(config.backend, BackendKind::V2);
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn zero_timeout_disables_it() {
        let config = ClientConfig::from_lookup(env(&[
            (API_URL_ENV, "http://localhost:8000"),
            (TIMEOUT_ENV, "0"),
        ]))
        .unwrap();
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn url_is_required() {
        assert!(ClientConfig::from_lookup(env(&[])).is_err());
    }

    #[test]
    fn rejects_unknown_backend() {
        let result = ClientConfig::from_lookup(env(&[
            (API_URL_ENV, "https://api.example.com"),
            (BACKEND_ENV, "v9"),
        ]));
        assert!(result.is_err());
    }
}
