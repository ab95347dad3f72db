//! Multipart encoding of forms
//!
//! Create and update calls go out as `multipart/form-data` so that records
//! carrying a file (annonce attachment, event or ad picture) use the same
//! path as the others.

use reqwest::multipart::{Form, Part};

use super::error::BackendError;
use crate::models::{AnnonceForm, DocumentationForm, EvenementForm, PubliciteForm, UploadedFile};

/// A form that can be sent to the backend
pub trait FormPayload: Send + Sync {
    fn to_multipart(&self) -> Result<Form, BackendError>;
}

/// Payload of resources the front-end never writes (experts, users)
#[derive(Debug)]
pub enum ReadOnly {}

impl FormPayload for ReadOnly {
    fn to_multipart(&self) -> Result<Form, BackendError> {
        match *self {}
    }
}

fn file_part(file: &UploadedFile) -> Result<Part, BackendError> {
    Part::bytes(file.bytes.clone())
        .file_name(file.filename.clone())
        .mime_str(&file.content_type)
        .map_err(|e| BackendError::Upload(format!("{}: {}", file.filename, e)))
}

/// Optional text fields are skipped when blank so the backend keeps its default
fn optional_text(form: Form, name: &'static str, value: &str) -> Form {
    if value.is_empty() {
        form
    } else {
        form.text(name, value.to_string())
    }
}

fn optional_file(form: Form, name: &'static str, file: Option<&UploadedFile>) -> Result<Form, BackendError> {
    Ok(match file {
        Some(file) => form.part(name, file_part(file)?),
        None => form,
    })
}

impl FormPayload for AnnonceForm {
    fn to_multipart(&self) -> Result<Form, BackendError> {
        let form = Form::new()
            .text("titre", self.title.clone())
            .text("description", self.description.clone())
            .text("categorie", self.category.clone())
            .text("contact", self.contact.clone());
        let form = optional_text(form, "localisation", &self.location);
        let form = optional_text(form, "tags", &self.tag_list().join(","));
        optional_file(form, "pieces_jointes", self.attachment.as_ref())
    }
}

impl FormPayload for EvenementForm {
    fn to_multipart(&self) -> Result<Form, BackendError> {
        let form = Form::new()
            .text("titre", self.title.clone())
            .text("description", self.description.clone())
            .text("date", self.date.clone())
            .text("heure_debut", self.starts_at.clone())
            .text("heure_fin", self.ends_at.clone())
            .text("lieu", self.venue.clone())
            .text("categorie", self.category.clone());
        let form = optional_text(form, "tags", &self.tags);
        let form = optional_text(form, "lien_inscription", &self.registration_link);
        optional_file(form, "image", self.image.as_ref())
    }
}

impl FormPayload for PubliciteForm {
    fn to_multipart(&self) -> Result<Form, BackendError> {
        let form = Form::new()
            .text("titre", self.title.clone())
            .text("contenu", self.content.clone())
            .text("badge", self.badge.clone())
            .text("lien", self.link.clone())
            .text("contact", self.contact.clone());
        let form = optional_text(form, "date_publication", &self.published_on);
        optional_file(form, "image", self.image.as_ref())
    }
}

impl FormPayload for DocumentationForm {
    fn to_multipart(&self) -> Result<Form, BackendError> {
        let form = Form::new()
            .text("titre", self.title.clone())
            .text("categorie", self.category.clone())
            .text("contenu", self.content.clone());
        Ok(optional_text(form, "lien", &self.link))
    }
}
