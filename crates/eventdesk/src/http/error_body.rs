//! Extraction of user-facing messages from backend error payloads.
//!
//! The backend reports failures in several shapes (field error maps, a bare
//! `detail`, nested `error` objects). [`format_error`] reduces all of them to a
//! single line, which is also what stale-token detection matches against.

use serde_json::Value;

/// Message used when no response was received at all.
pub const NETWORK_ERROR_MESSAGE: &str = "Network Error: Unable to reach the server";

/// Message used when the payload carries nothing readable.
pub const FALLBACK_MESSAGE: &str = "Oops! Something went wrong.";

/// Format an error payload into a single message.
///
/// Looks at `errors`, then `error`, then the root object, and takes its first
/// entry. Field errors that mention "required" are prefixed with the field
/// name. Falls back to `message`, then `detail`, then [`FALLBACK_MESSAGE`].
pub fn format_error(body: Option<&Value>) -> String {
    let Some(body) = body else {
        return FALLBACK_MESSAGE.to_string();
    };

    let errors = body
        .get("errors")
        .filter(|v| is_truthy(v))
        .or_else(|| body.get("error").filter(|v| is_truthy(v)))
        .unwrap_or(body);

    if let Some(text) = first_entry_message(errors) {
        return text;
    }

    body.get("message")
        .and_then(Value::as_str)
        .or_else(|| body.get("detail").and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_MESSAGE)
        .to_string()
}

/// Extract a machine-readable error code, if the payload has one.
///
/// Accepts a root `code`, an `error.code`, or a bare string `error`.
pub fn error_code(body: &Value) -> Option<String> {
    if let Some(code) = body.get("code").and_then(Value::as_str) {
        return Some(code.to_string());
    }
    match body.get("error") {
        Some(Value::Object(inner)) => inner.get("code").and_then(Value::as_str).map(String::from),
        Some(Value::String(code)) => Some(code.clone()),
        _ => None,
    }
}

fn first_entry_message(errors: &Value) -> Option<String> {
    let (key, value) = errors.as_object()?.iter().next()?;

    let text = match value {
        Value::Array(items) => match items.first() {
            Some(Value::String(first)) => with_field(key, first),
            _ => match items.get(1) {
                Some(Value::Object(nested)) => {
                    let (nested_key, nested_value) = nested.iter().next()?;
                    format!("{}: {}", nested_key, display_value(nested_value))
                }
                _ => return None,
            },
        },
        Value::String(text) => with_field(key, text),
        _ => return None,
    };

    (!text.is_empty()).then_some(text)
}

fn with_field(key: &str, text: &str) -> String {
    if text.contains("required") {
        format!("{}: {}", key, text)
    } else {
        text.to_string()
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}
