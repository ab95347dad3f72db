//! Submitted form data and validation helpers

use serde::Serialize;
use std::collections::HashMap;

use crate::config::UploadConfig;

/// A file received from a browser form
#[derive(Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedFile")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Which allow-list an upload is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Attachment,
}

impl UploadedFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Check size and MIME type against the upload configuration
    pub fn check(&self, config: &UploadConfig, kind: UploadKind) -> Result<(), String> {
        if self.size() > config.max_file_size {
            return Err(format!(
                "Fichier trop volumineux (maximum {} Mo)",
                config.max_file_size / 1024 / 1024
            ));
        }
        let allowed = match kind {
            UploadKind::Image => config.is_image_allowed(&self.content_type),
            UploadKind::Attachment => config.is_attachment_allowed(&self.content_type),
        };
        if !allowed {
            return Err(format!("Type de fichier non autorisé : {}", self.content_type));
        }
        Ok(())
    }
}

/// A validation failure attached to a form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Text fields and files of a submitted form
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    values: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Browsers send an unnamed empty part when no file was picked; those are dropped
    pub fn insert_file(&mut self, name: impl Into<String>, file: UploadedFile) {
        if file.filename.is_empty() && file.bytes.is_empty() {
            return;
        }
        self.files.insert(name.into(), file);
    }

    /// Trimmed text value, empty when absent
    pub fn text(&self, name: &str) -> String {
        self.values
            .get(name)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

impl From<HashMap<String, String>> for FormFields {
    fn from(values: HashMap<String, String>) -> Self {
        Self {
            values,
            files: HashMap::new(),
        }
    }
}

/// Accumulates field errors while validating a form
#[derive(Debug, Default)]
pub(crate) struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn required(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(FieldError::new(field, "Ce champ est obligatoire"));
        }
        self
    }

    pub fn url(&mut self, field: &'static str, value: &str) -> &mut Self {
        if !value.is_empty() && !is_http_url(value) {
            self.errors
                .push(FieldError::new(field, "Lien invalide (http:// ou https://)"));
        }
        self
    }

    pub fn check(&mut self, field: &'static str, ok: bool, message: &str) -> &mut Self {
        if !ok {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn upload(
        &mut self,
        field: &'static str,
        file: Option<&UploadedFile>,
        config: &UploadConfig,
        kind: UploadKind,
    ) -> &mut Self {
        if let Some(Err(message)) = file.map(|f| f.check(config, kind)) {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn finish(&mut self) -> Vec<FieldError> {
        std::mem::take(&mut self.errors)
    }
}

pub(crate) fn is_http_url(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(content_type: &str, size: usize) -> UploadedFile {
        UploadedFile {
            filename: "plan.pdf".to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0; size],
        }
    }

    #[test]
    fn test_empty_file_part_is_ignored() {
        let mut fields = FormFields::new();
        fields.insert_file(
            "image",
            UploadedFile {
                filename: String::new(),
                content_type: "application/octet-stream".to_string(),
                bytes: Vec::new(),
            },
        );
        assert!(fields.take_file("image").is_none());
    }

    #[test]
    fn test_text_is_trimmed() {
        let mut fields = FormFields::new();
        fields.insert("titre", "  Forum  ");
        assert_eq!(fields.text("titre"), "Forum");
        assert_eq!(fields.text("absent"), "");
    }

    #[test]
    fn test_upload_checks() {
        let mut config = UploadConfig::default();
        config.max_file_size = 10;

        assert!(file("application/pdf", 4).check(&config, UploadKind::Attachment).is_ok());
        assert!(file("application/pdf", 4).check(&config, UploadKind::Image).is_err());
        assert!(file("image/png", 11).check(&config, UploadKind::Image).is_err());
    }

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("https://salon-agriculture-dakar.com"));
        assert!(is_http_url("HTTP://example.org/path"));
        assert!(!is_http_url("ftp://example.org"));
        assert!(!is_http_url("https://"));
        assert!(!is_http_url("javascript:alert(1)"));
    }
}
