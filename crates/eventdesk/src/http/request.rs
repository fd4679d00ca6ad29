//! Outgoing requests and received responses.

use std::collections::BTreeMap;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::Result;
use crate::auth::AccessToken;
use crate::error::{ApiError, InvalidInputError};

use super::multipart::MultipartForm;

/// Query parameters, ordered so equal parameter sets compare and hash equal.
pub type Params = BTreeMap<String, String>;

/// What a request carries after its headers.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Multipart(MultipartForm),
}

/// One logical request to the backend.
///
/// The `retried` marker belongs to the pipeline: it is set at most once, when
/// the request is replayed after a token refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    params: Params,
    body: Option<RequestBody>,
    headers: HeaderMap,
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Params::new(),
            body: None,
            headers: HeaderMap::new(),
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add one query parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Add a set of query parameters.
    pub fn with_params(mut self, params: Params) -> Self {
        self.params.extend(params);
        self
    }

    /// Attach a JSON body.
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Attach a `multipart/form-data` body.
    pub fn with_multipart(mut self, form: MultipartForm) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }

    /// Add a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The JSON body, if the request has one.
    pub fn body(&self) -> Option<&Value> {
        match &self.body {
            Some(RequestBody::Json(value)) => Some(value),
            _ => None,
        }
    }

    /// The multipart body, if the request has one.
    pub fn form(&self) -> Option<&MultipartForm> {
        match &self.body {
            Some(RequestBody::Multipart(form)) => Some(form),
            _ => None,
        }
    }

    pub fn request_body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// True once the pipeline has replayed this request.
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }

    /// Set `Authorization: Bearer <token>`, replacing any previous value.
    pub(crate) fn set_bearer(&mut self, token: &AccessToken) {
        match HeaderValue::from_str(&token.bearer()) {
            Ok(mut value) => {
                value.set_sensitive(true);
                self.headers.insert(AUTHORIZATION, value);
            }
            Err(_) => {
                tracing::warn!("Access token contains characters not allowed in a header");
            }
        }
    }

    /// The bearer token currently attached, if any.
    pub fn bearer_token(&self) -> Option<AccessToken> {
        self.headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
            .map(AccessToken::new)
    }
}

/// A response the backend produced, whatever its status.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// A JSON response, mostly useful for scripted transports.
    pub fn json(status: StatusCode, body: &Value) -> Self {
        Self::new(status, HeaderMap::new(), body.to_string().into_bytes())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// The body as JSON; an empty body reads as `null`.
    pub fn json_value(&self) -> Result<Value> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&self.body).map_err(|e| {
            InvalidInputError::Decode {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Decode the body into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.json_value()?)?)
    }

    /// Convert a non-success response into an [`ApiError`].
    pub fn into_error(self) -> ApiError {
        ApiError::from_body(self.status.as_u16(), &self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bearer_round_trip() {
        let mut request = ApiRequest::get("/events/42");
        assert!(request.bearer_token().is_none());

        request.set_bearer(&AccessToken::new("a1"));
        assert_eq!(request.bearer_token(), Some(AccessToken::new("a1")));

        request.set_bearer(&AccessToken::new("a2"));
        assert_eq!(request.bearer_token(), Some(AccessToken::new("a2")));
        assert_eq!(request.headers().get_all(AUTHORIZATION).iter().count(), 1);
    }

    #[test]
    fn debug_hides_authorization() {
        let mut request = ApiRequest::get("/events/42");
        request.set_bearer(&AccessToken::new("very-secret-token"));
        assert!(!format!("{:?}", request).contains("very-secret-token"));
    }

    #[test]
    fn params_are_ordered() {
        let request = ApiRequest::get("/events")
            .with_param("page", 2)
            .with_param("active", true);
        let keys: Vec<_> = request.params().keys().cloned().collect();
        assert_eq!(keys, vec!["active", "page"]);
    }

    #[test]
    fn multipart_replaces_json_body() {
        let form = MultipartForm::new().text("event_name", "Night Market");
        let request = ApiRequest::post("/inventory/organizer/events/")
            .with_json(json!({"event_name": "Night Market"}))
            .with_multipart(form.clone());

        assert!(request.body().is_none());
        assert_eq!(request.form(), Some(&form));
    }

    #[test]
    fn empty_body_is_null() {
        let response = ApiResponse::new(StatusCode::NO_CONTENT, HeaderMap::new(), Vec::new());
        assert_eq!(response.json_value().unwrap(), Value::Null);
        response.decode::<()>().unwrap();
    }

    #[test]
    fn error_conversion_reads_body() {
        let response = ApiResponse::json(
            StatusCode::BAD_REQUEST,
            &json!({"errors": {"code": ["This field is required."]}}),
        );
        let error = response.into_error();
        assert_eq!(error.status, 400);
        assert_eq!(error.message, "code: This field is required.");
    }
}
