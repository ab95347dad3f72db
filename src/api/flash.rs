//! Flash toasts
//!
//! A toast set by a form handler travels across the redirect in a short-lived
//! cookie holding URL-encoded JSON, and is shown once by the next page.

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use super::middleware::read_cookie;
use crate::services::ServiceError;

pub const COOKIE_NAME: &str = "ideal_flash";

/// Seconds a toast survives if no page picks it up
const MAX_AGE: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

/// One-shot notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub message: String,
    /// Per-field messages for failed forms
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl Toast {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            title: title.into(),
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            title: title.into(),
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// Error toast for a failed service call, listing field errors if any
    pub fn from_error(error: &ServiceError) -> Self {
        let mut toast = Self::error(error.title(), error.user_message());
        toast.details = error
            .field_errors()
            .iter()
            .map(|e| format!("{} : {}", e.field, e.message))
            .collect();
        toast
    }

    /// `Set-Cookie` value carrying this toast
    pub fn to_cookie(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            COOKIE_NAME,
            urlencoding::encode(&json),
            MAX_AGE
        )
    }
}

/// Pending toast from the request cookies; unreadable values are ignored
pub fn read(headers: &HeaderMap) -> Option<Toast> {
    let raw = read_cookie(headers, COOKIE_NAME)?;
    let json = urlencoding::decode(&raw).ok()?;
    match serde_json::from_str(&json) {
        Ok(toast) => Some(toast),
        Err(e) => {
            tracing::debug!("Ignoring malformed flash cookie: {}", e);
            None
        }
    }
}

/// `Set-Cookie` value removing the toast
pub fn clear_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", COOKIE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};
    use crate::models::FieldError;

    fn headers_with(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    /// Turn a `Set-Cookie` value into the `Cookie` header a browser would send
    fn sent_back(set_cookie: &str) -> String {
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[test]
    fn test_toast_survives_the_cookie() {
        let toast = Toast::success("Annonce publiée", "Votre annonce est en ligne, merci !");
        let cookie = toast.to_cookie();
        assert!(cookie.contains("HttpOnly"));
        assert!(!sent_back(&cookie).contains(' '));

        let headers = headers_with(&format!("ideal_session=abc; {}", sent_back(&cookie)));
        assert_eq!(read(&headers), Some(toast));
    }

    #[test]
    fn test_malformed_cookie_is_ignored() {
        assert_eq!(read(&headers_with("ideal_flash=%7Bnot-json")), None);
        assert_eq!(read(&headers_with("ideal_flash=")), None);
        assert_eq!(read(&HeaderMap::new()), None);
    }

    #[test]
    fn test_error_toast_lists_fields() {
        let error = ServiceError::Validation(vec![
            FieldError::new("titre", "Ce champ est obligatoire"),
            FieldError::new("contact", "Ce champ est obligatoire"),
        ]);
        let toast = Toast::from_error(&error);
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.title, "Formulaire incomplet");
        assert_eq!(toast.details, vec![
            "titre : Ce champ est obligatoire".to_string(),
            "contact : Ce champ est obligatoire".to_string(),
        ]);
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        assert!(clear_cookie().starts_with("ideal_flash=;"));
        assert!(clear_cookie().contains("Max-Age=0"));
    }
}
