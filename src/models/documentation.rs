//! Documentation resource model

use serde::{Deserialize, Serialize};

use super::choice::choice_enum;
use super::form::{FieldError, FormFields, Validator};
use super::wire;

choice_enum! {
    /// Documentation category
    pub enum DocumentCategory {
        Commercial => ("commerciale", "Commerciale"),
        Legal => ("juridique", "Juridique"),
        Technical => ("technique", "Technique"),
        Other => ("autre", "Autre"),
    }
    fallback = Other;
}

const SUMMARY_CHARS: usize = 150;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Documentation {
    pub id: i64,
    #[serde(rename = "titre")]
    pub title: String,
    #[serde(rename = "categorie", default)]
    pub category: DocumentCategory,
    #[serde(rename = "contenu", default, deserialize_with = "wire::nullable_string")]
    pub content: String,
    #[serde(rename = "lien", default, deserialize_with = "wire::non_empty_string")]
    pub link: Option<String>,
}

impl Documentation {
    /// First 150 characters of the content followed by "..."
    pub fn summary(&self) -> String {
        let head: String = self.content.chars().take(SUMMARY_CHARS).collect();
        format!("{}...", head)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentationForm {
    #[serde(rename = "titre")]
    pub title: String,
    #[serde(rename = "categorie")]
    pub category: String,
    #[serde(rename = "contenu")]
    pub content: String,
    #[serde(rename = "lien")]
    pub link: String,
}

impl DocumentationForm {
    pub fn from_fields(fields: FormFields) -> Self {
        Self {
            title: fields.text("titre"),
            category: fields.text("categorie"),
            content: fields.text("contenu"),
            link: fields.text("lien"),
        }
    }

    pub fn from_document(doc: &Documentation) -> Self {
        Self {
            title: doc.title.clone(),
            category: doc.category.code().to_string(),
            content: doc.content.clone(),
            link: doc.link.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Vec<FieldError> {
        Validator::default()
            .required("titre", &self.title)
            .required("categorie", &self.category)
            .check(
                "categorie",
                self.category.is_empty() || DocumentCategory::from_code(&self.category).is_some(),
                "Catégorie inconnue",
            )
            .required("contenu", &self.content)
            .url("lien", &self.link)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str) -> Documentation {
        Documentation {
            id: 1,
            title: "Guide export".to_string(),
            category: DocumentCategory::Commercial,
            content: content.to_string(),
            link: None,
        }
    }

    #[test]
    fn test_summary_truncates_on_characters() {
        let long = "é".repeat(200);
        let summary = doc(&long).summary();
        assert_eq!(summary.chars().count(), 153);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_summary_of_short_content_still_has_ellipsis() {
        assert_eq!(doc("Court").summary(), "Court...");
    }

    #[test]
    fn test_form_validation() {
        let form = DocumentationForm {
            title: "Guide".to_string(),
            category: "fiscal".to_string(),
            content: "Contenu".to_string(),
            link: "ftp://docs".to_string(),
        };

        let fields: Vec<_> = form.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["categorie", "lien"]);
    }

    #[test]
    fn test_empty_category_reported_once() {
        let form = DocumentationForm {
            title: "Guide".to_string(),
            category: String::new(),
            content: "Contenu".to_string(),
            link: String::new(),
        };
        assert_eq!(form.validate().len(), 1);
    }
}
