//! Backend error type

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),

    #[error("backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("unexpected backend response: {0}")]
    Decode(String),

    #[error("invalid upload: {0}")]
    Upload(String),
}

impl BackendError {
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Token missing, expired or lacking permission
    pub fn is_auth(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Message suitable for a toast
    pub fn user_message(&self) -> String {
        match self {
            BackendError::InvalidUrl(_) | BackendError::Transport(_) => {
                "Le serveur est injoignable. Réessayez plus tard.".to_string()
            }
            BackendError::Status { status, detail } if detail.is_empty() => match status {
                401 => "Veuillez vous connecter pour continuer.".to_string(),
                403 => "Vous n'avez pas les droits nécessaires.".to_string(),
                404 => "Élément introuvable.".to_string(),
                _ => "Une erreur est survenue. Veuillez réessayer.".to_string(),
            },
            BackendError::Status { detail, .. } => detail.clone(),
            BackendError::Decode(_) => "Réponse inattendue du serveur.".to_string(),
            BackendError::Upload(message) => message.clone(),
        }
    }
}

/// Pull a readable message out of an error body.
///
/// Looks at `detail`, `error`, `non_field_errors` then the first field
/// error (`"champ: message"`). Returns an empty string when nothing fits.
pub(crate) fn extract_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return String::new();
    };
    let Value::Object(map) = value else {
        return first_message(&value).unwrap_or_default();
    };

    for key in ["detail", "error", "non_field_errors"] {
        if let Some(message) = map.get(key).and_then(first_message) {
            return message;
        }
    }

    map.iter()
        .find_map(|(field, value)| field_message(field, value))
        .unwrap_or_default()
}

/// Nested serializer errors (`{"user": {"username": [...]}}`) report the innermost field
fn field_message(field: &str, value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map.iter().find_map(|(inner, value)| field_message(inner, value)),
        _ => first_message(value).map(|message| format!("{}: {}", field, message)),
    }
}

fn first_message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => items.iter().find_map(first_message),
        _ => None,
    }
}
