//! Multipart form bodies.
//!
//! A request may be replayed after a token refresh, so the form is kept as
//! plain owned parts and only turned into a `reqwest` form when sent.

use std::fmt;

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

use crate::Result;
use crate::error::InvalidInputError;

/// A file attached to a form.
#[derive(Clone, PartialEq)]
pub struct FilePart {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl fmt::Debug for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// One named field of a form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text(String),
    File(FilePart),
}

/// A `multipart/form-data` body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    parts: Vec<(String, FormPart)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// A form with one text field per top-level field of `fields`.
    ///
    /// `fields` must serialize to an object. Null fields are left out,
    /// strings are sent as is and anything else as its JSON text.
    pub fn from_fields<B: Serialize + ?Sized>(fields: &B) -> Result<Self> {
        let Value::Object(map) = serde_json::to_value(fields)? else {
            return Err(InvalidInputError::Form {
                message: "form fields must serialize to an object".into(),
            }
            .into());
        };

        let mut form = Self::new();
        for (name, value) in map {
            match value {
                Value::Null => {}
                Value::String(text) => form = form.text(name, text),
                other => form = form.text(name, other.to_string()),
            }
        }
        Ok(form)
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push((name.into(), FormPart::Text(value.into())));
        self
    }

    pub fn file(mut self, name: impl Into<String>, file: FilePart) -> Self {
        self.parts.push((name.into(), FormPart::File(file)));
        self
    }

    pub fn parts(&self) -> &[(String, FormPart)] {
        &self.parts
    }

    /// The text value of the first field called `name`.
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|(n, part)| match part {
            FormPart::Text(text) if n == name => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub(crate) fn to_reqwest(&self) -> Result<Form> {
        let mut form = Form::new();
        for (name, part) in &self.parts {
            form = match part {
                FormPart::Text(text) => form.text(name.clone(), text.clone()),
                FormPart::File(file) => {
                    let mut part =
                        Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
                    if let Some(content_type) = &file.content_type {
                        part = part
                            .mime_str(content_type)
                            .map_err(|_| InvalidInputError::Form {
                                message: format!("invalid content type '{}'", content_type),
                            })?;
                    }
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fields_become_text_parts() {
        let form = MultipartForm::from_fields(&json!({
            "event_name": "Night Market",
            "participant_fee": 5000.0,
            "eventInstructions": null
        }))
        .unwrap();

        assert_eq!(form.text_value("event_name"), Some("Night Market"));
        assert_eq!(form.text_value("participant_fee"), Some("5000.0"));
        assert_eq!(form.text_value("eventInstructions"), None);
        assert_eq!(form.parts().len(), 2);
    }

    #[test]
    fn non_object_fields_are_rejected() {
        assert!(MultipartForm::from_fields(&json!(["a", "b"])).is_err());
    }

    #[test]
    fn debug_omits_file_bytes() {
        let file = FilePart::new("flier.png", vec![0x89, b'P', b'N', b'G'])
            .with_content_type("image/png");
        let debug = format!("{:?}", file);
        assert!(debug.contains("flier.png"));
        assert!(debug.contains("len: 4"));
    }

    #[test]
    fn bad_content_type_is_invalid_input() {
        let file = FilePart::new("x", vec![1]).with_content_type("not a mime\n");
        let form = MultipartForm::new().file("event_flier", file);
        assert!(form.to_reqwest().is_err());
    }
}
