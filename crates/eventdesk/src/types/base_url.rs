//! Where the dashboard backend lives.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

const LOOPBACK_HOSTS: [&str; 4] = ["localhost", "127.0.0.1", "[::1]", "::1"];

/// Root that every endpoint path is resolved against.
///
/// Plain `http` is only accepted for loopback hosts, so development servers
/// work without certificates. Any path on the root (such as `/api`) becomes a
/// prefix of every endpoint.
///
/// ```
/// use eventdesk::BaseUrl;
///
/// let base = BaseUrl::new("https://api.example.com/").unwrap();
/// assert_eq!(base.endpoint("/auth/refresh/"),
///            "https://api.example.com/auth/refresh/");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BaseUrl(Url);

impl BaseUrl {
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let raw = s.as_ref();
        let invalid = |reason: String| InvalidInputError::BaseUrl {
            value: raw.to_string(),
            reason,
        };

        let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        match rejection(&url) {
            Some(reason) => Err(invalid(reason.to_string()).into()),
            None => Ok(Self(url)),
        }
    }

    /// Joins `path` onto the root; a leading slash on `path` is optional.
    pub fn endpoint(&self, path: &str) -> String {
        // a bare host renders as "https://host/"
        let root = self.0.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{root}/{path}")
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// Whether the backend runs on this machine.
    pub fn is_localhost(&self) -> bool {
        is_loopback(&self.0)
    }
}

/// Why `url` cannot serve as an API root, if it can't.
fn rejection(url: &Url) -> Option<&'static str> {
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Some("expected an absolute URL with a host");
    }
    match url.scheme() {
        "https" => {}
        "http" if is_loopback(url) => {}
        _ => return Some("only https is allowed outside localhost"),
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Some("query strings and fragments are not allowed");
    }
    None
}

fn is_loopback(url: &Url) -> bool {
    url.host_str().is_some_and(|h| LOOPBACK_HOSTS.contains(&h))
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl FromStr for BaseUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for BaseUrl {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BaseUrl {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
