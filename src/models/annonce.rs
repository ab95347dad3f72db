//! Annonce (business listing) model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::choice::choice_enum;
use super::form::{FieldError, FormFields, UploadKind, UploadedFile, Validator};
use super::wire;
use crate::config::UploadConfig;

choice_enum! {
    /// Annonce category
    pub enum AnnonceCategory {
        BusinessOpportunity => ("opportunites_affaires", "Opportunités d'affaires"),
        ServiceOffer => ("offres_services", "Offres de services"),
        PartnerSearch => ("recherche_partenaires", "Recherche de partenaires"),
        LegalAdvice => ("conseil_juridique", "Conseil juridique"),
        Other => ("autre", "Autre"),
    }
    fallback = Other;
}

/// Listing published by an apporteur d'affaires
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annonce {
    pub id: i64,
    #[serde(rename = "titre")]
    pub title: String,
    #[serde(default, deserialize_with = "wire::nullable_string")]
    pub description: String,
    #[serde(rename = "categorie", default)]
    pub category: AnnonceCategory,
    #[serde(
        rename = "date_publication",
        default,
        deserialize_with = "wire::optional_datetime"
    )]
    pub published_at: Option<DateTime<Utc>>,
    /// Read-only author label computed by the backend
    #[serde(rename = "auteur", default, deserialize_with = "wire::non_empty_string")]
    pub author: Option<String>,
    /// URL of the attached file
    #[serde(
        rename = "pieces_jointes",
        default,
        deserialize_with = "wire::non_empty_string"
    )]
    pub attachment: Option<String>,
    #[serde(default, deserialize_with = "wire::nullable_string")]
    pub contact: String,
    #[serde(rename = "localisation", default, deserialize_with = "wire::nullable_string")]
    pub location: String,
    #[serde(default, deserialize_with = "wire::tags")]
    pub tags: Vec<String>,
}

impl Annonce {
    /// Published within the last seven days
    pub fn is_recent(&self, now: DateTime<Utc>) -> bool {
        self.published_at
            .map(|published| now - published <= Duration::days(7))
            .unwrap_or(false)
    }

    /// File name of the attachment, taken from the last URL segment
    pub fn attachment_name(&self) -> Option<&str> {
        self.attachment
            .as_deref()
            .and_then(|url| url.rsplit('/').next())
            .filter(|name| !name.is_empty())
    }
}

/// Input for publishing an annonce
#[derive(Debug, Clone)]
pub struct AnnonceForm {
    pub title: String,
    pub category: String,
    pub description: String,
    pub contact: String,
    pub location: String,
    pub tags: String,
    pub attachment: Option<UploadedFile>,
}

impl AnnonceForm {
    pub fn from_fields(mut fields: FormFields) -> Self {
        Self {
            title: fields.text("titre"),
            category: fields.text("categorie"),
            description: fields.text("description"),
            contact: fields.text("contact"),
            location: fields.text("localisation"),
            tags: fields.text("tags"),
            attachment: fields.take_file("pieces_jointes"),
        }
    }

    pub fn tag_list(&self) -> Vec<String> {
        wire::split_tags(&self.tags)
    }

    pub fn validate(&self, upload: &UploadConfig) -> Vec<FieldError> {
        Validator::default()
            .required("titre", &self.title)
            .check("titre", self.title.chars().count() <= 200, "200 caractères maximum")
            .required("description", &self.description)
            .check(
                "categorie",
                AnnonceCategory::from_code(&self.category).is_some(),
                "Catégorie inconnue",
            )
            .required("contact", &self.contact)
            .check("contact", self.contact.chars().count() <= 100, "100 caractères maximum")
            .upload(
                "pieces_jointes",
                self.attachment.as_ref(),
                upload,
                UploadKind::Attachment,
            )
            .finish()
    }
}
