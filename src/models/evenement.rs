//! Evenement (event) model

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::choice::{choice_enum, ChoiceOption};
use super::form::{FieldError, FormFields, UploadKind, UploadedFile, Validator};
use super::wire;
use crate::config::UploadConfig;

choice_enum! {
    /// Event category
    pub enum EventCategory {
        Conference => ("conference", "Conférence"),
        Workshop => ("atelier", "Atelier"),
        Networking => ("networking", "Networking"),
        Training => ("formation", "Formation"),
        Opportunities => ("opportunites", "Opportunités d'affaires"),
        Other => ("autre", "Autre"),
    }
    fallback = Other;
}

choice_enum! {
    /// Event theme tag
    pub enum EventTag {
        Agriculture => ("agricultur", "Agriculture"),
        Innovation => ("innovation", "Innovation"),
        Partnerships => ("partenariats", "Partenariats"),
        Investment => ("investissement", "Investissement"),
        Funding => ("financement", "Financement"),
        Other => ("autre", "Autre"),
    }
    fallback = Other;
}

impl EventCategory {
    /// Codes the backend accepts on create and update. `Other` only exists
    /// to decode codes this front-end does not know.
    pub const WRITABLE: &'static [EventCategory] = &[
        EventCategory::Conference,
        EventCategory::Workshop,
        EventCategory::Networking,
        EventCategory::Training,
        EventCategory::Opportunities,
    ];

    pub fn from_writable_code(code: &str) -> Option<Self> {
        Self::from_code(code).filter(|category| Self::WRITABLE.contains(category))
    }

    /// Options of the dashboard select
    pub fn writable_options() -> Vec<ChoiceOption> {
        Self::WRITABLE
            .iter()
            .map(|category| ChoiceOption {
                code: category.code(),
                label: category.label(),
            })
            .collect()
    }
}

/// Event published on the actualités page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evenement {
    pub id: i64,
    #[serde(rename = "titre")]
    pub title: String,
    #[serde(default, deserialize_with = "wire::nullable_string")]
    pub description: String,
    #[serde(default, deserialize_with = "wire::optional_date")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "heure_debut", default, deserialize_with = "wire::optional_time")]
    pub starts_at: Option<NaiveTime>,
    #[serde(rename = "heure_fin", default, deserialize_with = "wire::optional_time")]
    pub ends_at: Option<NaiveTime>,
    #[serde(rename = "lieu", default, deserialize_with = "wire::nullable_string")]
    pub venue: String,
    #[serde(rename = "categorie", default)]
    pub category: EventCategory,
    #[serde(default)]
    pub tags: EventTag,
    #[serde(
        rename = "lien_inscription",
        default,
        deserialize_with = "wire::non_empty_string"
    )]
    pub registration_link: Option<String>,
    #[serde(default, deserialize_with = "wire::non_empty_string")]
    pub image_url: Option<String>,
}

impl Evenement {
    /// Happening right now: same day and within the start/end hours
    pub fn is_ongoing(&self, now: DateTime<Utc>) -> bool {
        match (self.date, self.starts_at, self.ends_at) {
            (Some(date), Some(start), Some(end)) => {
                let time = now.time();
                date == now.date_naive() && start <= time && time <= end
            }
            _ => false,
        }
    }

    /// Strictly after `today`
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.date.map(|date| date > today).unwrap_or(false)
    }

    /// "09:00 - 18:00", or whichever bound is known
    pub fn schedule(&self) -> String {
        let fmt = |t: NaiveTime| t.format("%H:%M").to_string();
        match (self.starts_at, self.ends_at) {
            (Some(start), Some(end)) => format!("{} - {}", fmt(start), fmt(end)),
            (Some(start), None) => fmt(start),
            (None, Some(end)) => format!("jusqu'à {}", fmt(end)),
            (None, None) => String::new(),
        }
    }
}

/// Input for creating or updating an event.
/// Serializes under the input names to pre-fill the edit form.
#[derive(Debug, Clone, Serialize)]
pub struct EvenementForm {
    #[serde(rename = "titre")]
    pub title: String,
    pub description: String,
    pub date: String,
    #[serde(rename = "categorie")]
    pub category: String,
    pub tags: String,
    #[serde(rename = "heure_debut")]
    pub starts_at: String,
    #[serde(rename = "heure_fin")]
    pub ends_at: String,
    #[serde(rename = "lieu")]
    pub venue: String,
    #[serde(rename = "lien_inscription")]
    pub registration_link: String,
    #[serde(skip)]
    pub image: Option<UploadedFile>,
}

impl EvenementForm {
    pub fn from_fields(mut fields: FormFields) -> Self {
        Self {
            title: fields.text("titre"),
            description: fields.text("description"),
            date: fields.text("date"),
            category: fields.text("categorie"),
            tags: fields.text("tags"),
            starts_at: fields.text("heure_debut"),
            ends_at: fields.text("heure_fin"),
            venue: fields.text("lieu"),
            registration_link: fields.text("lien_inscription"),
            image: fields.take_file("image"),
        }
    }

    /// Pre-fill from an existing event (edit dialog)
    pub fn from_event(event: &Evenement) -> Self {
        let time = |t: Option<NaiveTime>| t.map(|t| t.format("%H:%M").to_string()).unwrap_or_default();
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            date: event.date.map(|d| d.to_string()).unwrap_or_default(),
            category: EventCategory::from_writable_code(event.category.code())
                .map(|category| category.code().to_string())
                .unwrap_or_default(),
            tags: event.tags.code().to_string(),
            starts_at: time(event.starts_at),
            ends_at: time(event.ends_at),
            venue: event.venue.clone(),
            registration_link: event.registration_link.clone().unwrap_or_default(),
            image: None,
        }
    }

    pub fn validate(&self, upload: &UploadConfig) -> Vec<FieldError> {
        let start = wire::parse_time(&self.starts_at);
        let end = wire::parse_time(&self.ends_at);

        let mut validator = Validator::default();
        validator
            .required("titre", &self.title)
            .required("date", &self.date)
            .check(
                "date",
                self.date.is_empty() || wire::parse_date(&self.date).is_some(),
                "Date invalide (AAAA-MM-JJ)",
            )
            .check(
                "categorie",
                EventCategory::from_writable_code(&self.category).is_some(),
                "Catégorie inconnue",
            )
            .check(
                "tags",
                self.tags.is_empty() || EventTag::from_code(&self.tags).is_some(),
                "Thème inconnu",
            )
            .required("heure_debut", &self.starts_at)
            .check(
                "heure_debut",
                self.starts_at.is_empty() || start.is_some(),
                "Heure invalide (HH:MM)",
            )
            .required("heure_fin", &self.ends_at)
            .check(
                "heure_fin",
                self.ends_at.is_empty() || end.is_some(),
                "Heure invalide (HH:MM)",
            )
            .required("lieu", &self.venue)
            .url("lien_inscription", &self.registration_link)
            .upload("image", self.image.as_ref(), upload, UploadKind::Image);

        if let (Some(start), Some(end)) = (start, end) {
            validator.check(
                "heure_fin",
                end >= start,
                "L'heure de fin précède l'heure de début",
            );
        }
        validator.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(date: &str, start: &str, end: &str) -> Evenement {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "titre": "Forum des Investisseurs Africains",
            "description": "Rencontre entre investisseurs",
            "date": date,
            "heure_debut": start,
            "heure_fin": end,
            "lieu": "Hôtel Radisson Blu, Abidjan",
            "categorie": "networking",
            "tags": "investissement",
            "lien_inscription": "",
            "image_url": null
        }))
        .unwrap()
    }

    fn valid_form() -> EvenementForm {
        EvenementForm {
            title: "Salon de l'Agriculture".to_string(),
            description: String::new(),
            date: "2024-03-15".to_string(),
            category: "conference".to_string(),
            tags: String::new(),
            starts_at: "09:00".to_string(),
            ends_at: "18:00".to_string(),
            venue: "Dakar".to_string(),
            registration_link: "https://salon-agriculture-dakar.com".to_string(),
            image: None,
        }
    }

    #[test]
    fn test_deserialize_backend_payload() {
        let ev = event("2024-02-28", "08:30:00", "17:00:00");
        assert_eq!(ev.category, EventCategory::Networking);
        assert_eq!(ev.tags, EventTag::Investment);
        assert!(ev.registration_link.is_none());
        assert_eq!(ev.schedule(), "08:30 - 17:00");
    }

    #[test]
    fn test_default_tag_value_falls_back() {
        let mut json = serde_json::to_value(event("2024-02-28", "08:30", "17:00")).unwrap();
        json["tags"] = serde_json::json!("default_value");
        let ev: Evenement = serde_json::from_value(json).unwrap();
        assert_eq!(ev.tags, EventTag::Other);
    }

    #[test]
    fn test_is_ongoing() {
        let ev = event("2024-02-28", "08:30", "17:00");
        let during = Utc.with_ymd_and_hms(2024, 2, 28, 12, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 2, 28, 17, 30, 0).unwrap();
        let other_day = Utc.with_ymd_and_hms(2024, 2, 27, 12, 0, 0).unwrap();

        assert!(ev.is_ongoing(during));
        assert!(!ev.is_ongoing(after));
        assert!(!ev.is_ongoing(other_day));
    }

    #[test]
    fn test_is_upcoming_is_strict() {
        let ev = event("2024-04-10", "10:00", "19:00");
        let day = NaiveDate::from_ymd_opt(2024, 4, 10).unwrap();
        assert!(!ev.is_upcoming(day));
        assert!(ev.is_upcoming(day.pred_opt().unwrap()));
    }

    #[test]
    fn test_form_round_trips_existing_event() {
        let form = EvenementForm::from_event(&event("2024-02-28", "08:30:00", "17:00:00"));
        assert_eq!(form.date, "2024-02-28");
        assert_eq!(form.starts_at, "08:30");
        assert_eq!(form.category, "networking");
        assert!(form.validate(&UploadConfig::default()).is_empty());
    }

    #[test]
    fn test_form_rejects_inverted_hours_and_bad_link() {
        let form = EvenementForm {
            starts_at: "18:00".to_string(),
            ends_at: "09:00".to_string(),
            registration_link: "salon.sn".to_string(),
            ..valid_form()
        };

        let fields: Vec<_> = form
            .validate(&UploadConfig::default())
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["lien_inscription", "heure_fin"]);
    }

    #[test]
    fn test_other_category_is_decode_only() {
        let form = EvenementForm {
            category: "autre".to_string(),
            ..valid_form()
        };
        let errors = form.validate(&UploadConfig::default());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "categorie");

        let codes: Vec<_> = EventCategory::writable_options().into_iter().map(|o| o.code).collect();
        assert!(!codes.contains(&"autre"));
        assert_eq!(codes.len(), EventCategory::ALL.len() - 1);

        // an event stored under an unknown code is not pre-filled with "autre"
        let mut json = serde_json::to_value(event("2024-02-28", "08:30", "17:00")).unwrap();
        json["categorie"] = serde_json::json!("salon");
        let ev: Evenement = serde_json::from_value(json).unwrap();
        assert_eq!(ev.category, EventCategory::Other);
        assert_eq!(EvenementForm::from_event(&ev).category, "");
    }

    #[test]
    fn test_form_rejects_malformed_date() {
        let form = EvenementForm {
            date: "15/03/2024".to_string(),
            ..valid_form()
        };
        let errors = form.validate(&UploadConfig::default());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "date");
    }
}
