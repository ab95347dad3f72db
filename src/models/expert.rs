//! Expert profile model

use serde::{Deserialize, Serialize};

use super::choice::choice_enum;
use super::user::UserInfo;
use super::wire;

choice_enum! {
    /// Service offered by an expert
    pub enum ExpertService {
        CustomsClearance => ("dedouanement", "Dédouanement"),
        Transport => ("transport", "Transport"),
        Logistics => ("logistique", "Logistique"),
        LegalAdvice => ("conseil_juridique", "Conseil juridique"),
        Contracts => ("contrats", "Contrats"),
        Funding => ("financement", "Financement"),
        Other => ("autre", "Autre"),
    }
    fallback = Other;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expert {
    pub id: i64,
    pub user: UserInfo,
    /// Years of experience
    #[serde(rename = "duree_experience", default)]
    pub experience_years: u32,
    #[serde(rename = "specialite", default, deserialize_with = "wire::nullable_string")]
    pub specialty: String,
    #[serde(rename = "localisation", default, deserialize_with = "wire::nullable_string")]
    pub location: String,
    #[serde(rename = "services_proposes", default)]
    pub service: ExpertService,
}

impl Expert {
    pub fn display_name(&self) -> String {
        self.user.display_name()
    }

    /// Two-letter initials for the avatar
    pub fn initials(&self) -> String {
        let first = self.user.first_name.chars().next();
        let last = self.user.last_name.chars().next();
        match (first, last) {
            (Some(f), Some(l)) => format!("{}{}", f, l).to_uppercase(),
            _ => self
                .user
                .username
                .chars()
                .take(2)
                .collect::<String>()
                .to_uppercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expert(first: &str, last: &str) -> Expert {
        serde_json::from_value(serde_json::json!({
            "id": 4,
            "user": {
                "id": 9,
                "username": "moussa",
                "first_name": first,
                "last_name": last,
                "email": "moussa@example.com"
            },
            "duree_experience": 12,
            "specialite": "Commerce international",
            "localisation": "Dakar",
            "services_proposes": "dedouanement"
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_nested_user() {
        let e = expert("Moussa", "Diop");
        assert_eq!(e.user.username, "moussa");
        assert_eq!(e.experience_years, 12);
        assert_eq!(e.service, ExpertService::CustomsClearance);
        assert_eq!(e.display_name(), "Moussa Diop");
        assert_eq!(e.initials(), "MD");
    }

    #[test]
    fn test_initials_fall_back_to_username() {
        let e = expert("", "");
        assert_eq!(e.display_name(), "moussa");
        assert_eq!(e.initials(), "MO");
    }
}
