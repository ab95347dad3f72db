//! Services layer - Business logic
//!
//! Services sit between the web handlers and the backend client:
//! - Validating forms before anything is sent
//! - Caching public lists and invalidating them on writes
//! - Turning backend tokens into server-side sessions

pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod filter;
pub mod session;

pub use auth::AuthService;
pub use catalog::{CatalogForm, CatalogService};
pub use dashboard::DashboardStats;
pub use filter::{ListingFilter, Searchable};
pub use session::SessionStore;

use crate::backend::BackendError;
use crate::models::FieldError;

/// Error types for service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The submitted form has invalid fields
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// Wrong username or password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Signed in, but the role may not access this area
    #[error("Access denied")]
    AccessDenied,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ServiceError {
    pub fn is_auth(&self) -> bool {
        match self {
            ServiceError::Backend(e) => e.is_auth(),
            ServiceError::InvalidCredentials | ServiceError::AccessDenied => true,
            ServiceError::Validation(_) => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Backend(e) if e.is_not_found())
    }

    /// Short toast title
    pub fn title(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "Formulaire incomplet",
            ServiceError::InvalidCredentials => "Échec de la connexion",
            ServiceError::AccessDenied => "Accès refusé",
            ServiceError::Backend(_) => "Erreur",
        }
    }

    /// Toast description
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Validation(errors) => match errors.as_slice() {
                [only] => only.message.clone(),
                _ => "Veuillez corriger les champs signalés.".to_string(),
            },
            ServiceError::InvalidCredentials => {
                "Nom d'utilisateur ou mot de passe incorrect".to_string()
            }
            ServiceError::AccessDenied => {
                "Vous n'êtes pas autorisé à accéder à l'administration.".to_string()
            }
            ServiceError::Backend(e) => e.user_message(),
        }
    }

    /// Field errors to show next to the inputs
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ServiceError::Validation(errors) => errors,
            _ => &[],
        }
    }
}
