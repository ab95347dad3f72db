//! Session model

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::user::Role;

/// Signed-in visitor, stored server side and keyed by the session cookie
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    /// Session ID (cookie value)
    pub id: String,
    /// Backend access token
    #[serde(skip_serializing)]
    pub access_token: String,
    #[serde(skip_serializing)]
    pub refresh_token: String,
    pub role: Role,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Name shown in the welcome banner
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            "Utilisateur".to_string()
        } else {
            parts.join(" ")
        }
    }
}
