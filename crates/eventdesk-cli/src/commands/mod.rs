//! Subcommand implementations.

pub mod auth;
pub mod codes;
pub mod events;
pub mod locations;

use anyhow::{Result, bail};
use eventdesk::http::Params;

/// Convert a client error into one carrying the message a user should see.
pub fn user_facing(err: eventdesk::Error) -> anyhow::Error {
    anyhow::anyhow!(err.user_message())
}

/// Parse repeated `key=value` arguments into query parameters.
pub fn parse_params(pairs: &[String]) -> Result<Params> {
    let mut params = Params::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid parameter '{}', expected key=value", pair);
        };
        if key.is_empty() {
            bail!("Invalid parameter '{}', key is empty", pair);
        }
        params.insert(key.to_string(), value.to_string());
    }
    Ok(params)
}
