//! Publicite (advertisement) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::form::{FieldError, FormFields, UploadKind, UploadedFile, Validator};
use super::wire;
use crate::config::UploadConfig;

/// Advertisement shown beside the events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publicite {
    pub id: i64,
    #[serde(rename = "titre")]
    pub title: String,
    #[serde(rename = "contenu", default, deserialize_with = "wire::nullable_string")]
    pub content: String,
    #[serde(default, deserialize_with = "wire::non_empty_string")]
    pub badge: Option<String>,
    #[serde(rename = "lien", default, deserialize_with = "wire::non_empty_string")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "wire::non_empty_string")]
    pub contact: Option<String>,
    #[serde(
        rename = "date_publication",
        default,
        deserialize_with = "wire::optional_datetime"
    )]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "wire::non_empty_string")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PubliciteForm {
    #[serde(rename = "titre")]
    pub title: String,
    #[serde(rename = "contenu")]
    pub content: String,
    pub badge: String,
    #[serde(rename = "lien")]
    pub link: String,
    pub contact: String,
    /// `YYYY-MM-DD`, empty to let the backend stamp it
    #[serde(rename = "date_publication")]
    pub published_on: String,
    #[serde(skip)]
    pub image: Option<UploadedFile>,
}

impl PubliciteForm {
    pub fn from_fields(mut fields: FormFields) -> Self {
        Self {
            title: fields.text("titre"),
            content: fields.text("contenu"),
            badge: fields.text("badge"),
            link: fields.text("lien"),
            contact: fields.text("contact"),
            published_on: fields.text("date_publication"),
            image: fields.take_file("image"),
        }
    }

    pub fn from_ad(ad: &Publicite) -> Self {
        Self {
            title: ad.title.clone(),
            content: ad.content.clone(),
            badge: ad.badge.clone().unwrap_or_default(),
            link: ad.link.clone().unwrap_or_default(),
            contact: ad.contact.clone().unwrap_or_default(),
            published_on: ad
                .published_at
                .map(|at| at.date_naive().to_string())
                .unwrap_or_default(),
            image: None,
        }
    }

    pub fn validate(&self, upload: &UploadConfig) -> Vec<FieldError> {
        Validator::default()
            .required("titre", &self.title)
            .required("contenu", &self.content)
            .url("lien", &self.link)
            .check(
                "date_publication",
                self.published_on.is_empty() || wire::parse_date(&self.published_on).is_some(),
                "Date invalide (AAAA-MM-JJ)",
            )
            .upload("image", self.image.as_ref(), upload, UploadKind::Image)
            .finish()
    }
}
