//! Multipart form payloads.

use super::{ApiError, ApiResult};
use crate::media_capture::StagedFile;

/// A single multipart field.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text(String),
    File(StagedFile),
}

/// Ordered multipart payload.
///
/// Kept as plain data until it is sent so callers and tests can inspect
/// exactly which fields a submission carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormPayload {
    parts: Vec<(String, FormPart)>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_text(name, value);
        self
    }

    /// Builder-style file field.
    pub fn file(mut self, name: impl Into<String>, file: StagedFile) -> Self {
        self.push_file(name, file);
        self
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parts.push((name.into(), FormPart::Text(value.into())));
    }

    pub fn push_file(&mut self, name: impl Into<String>, file: StagedFile) {
        self.parts.push((name.into(), FormPart::File(file)));
    }

    /// Append a text field only when a value is present.
    pub fn push_optional_text(&mut self, name: impl Into<String>, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.push_text(name, value);
        }
    }

    pub fn parts(&self) -> &[(String, FormPart)] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// First text value of the named field.
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|(field, part)| match part {
            FormPart::Text(value) if field == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// First file attached under the named field.
    pub fn file_value(&self, name: &str) -> Option<&StagedFile> {
        self.parts.iter().find_map(|(field, part)| match part {
            FormPart::File(file) if field == name => Some(file),
            _ => None,
        })
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(name, _)| name.as_str())
    }

    /// Convert into a transport-level multipart form.
    pub(crate) fn into_form(self) -> ApiResult<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for (name, part) in self.parts {
            form = match part {
                FormPart::Text(value) => form.text(name, value),
                FormPart::File(file) => {
                    let StagedFile { name: file_name, mime, data } = file;
                    let part = reqwest::multipart::Part::bytes(data)
                        .file_name(file_name)
                        .mime_str(&mime)
                        .map_err(|e| ApiError::Decode(format!("invalid MIME type '{}': {}", mime, e)))?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_keeps_field_order() {
        let mut payload = FormPayload::new()
            .text("name", "Hero")
            .file("main_image", StagedFile::new("hero.png", vec![0u8; 16]));
        payload.push_optional_text("description", None::<String>);
        payload.push_optional_text("shot_duration", Some("4"));

        let names: Vec<&str> = payload.field_names().collect();
        assert_eq!(names, vec!["name", "main_image", "shot_duration"]);
        assert_eq!(payload.text_value("name"), Some("Hero"));
        assert_eq!(payload.file_value("main_image").map(|f| f.size()), Some(16));
        assert!(payload.file_value("name").is_none());
    }
}
