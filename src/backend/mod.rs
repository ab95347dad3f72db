//! Backend REST API access
//!
//! Every record the platform shows lives in the remote backend. This module
//! holds the HTTP client that talks to it, the multipart encoding of forms,
//! and the generic repository used by the services.

mod client;
mod error;
mod payload;
mod repository;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{BackendClient, TokenPair};
pub use error::BackendError;
pub use payload::{FormPayload, ReadOnly};
pub use repository::{HttpResourceRepository, ResourceRepository};

/// Collections exposed by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Annonces,
    Evenements,
    Publicites,
    Documentations,
    Experts,
    Users,
}

impl Resource {
    /// Collection name, also used as the cache key prefix
    pub fn name(self) -> &'static str {
        match self {
            Resource::Annonces => "annonces",
            Resource::Evenements => "evenements",
            Resource::Publicites => "publicites",
            Resource::Documentations => "documentations",
            Resource::Experts => "experts",
            Resource::Users => "users",
        }
    }

    /// Collection path relative to the API base (`evenements/`)
    pub fn collection_path(self) -> String {
        format!("{}/", self.name())
    }

    /// Record path relative to the API base (`evenements/7/`)
    pub fn item_path(self, id: i64) -> String {
        format!("{}/{}/", self.name(), id)
    }

    /// Lists anyone may read without a token
    pub fn is_public(self) -> bool {
        matches!(
            self,
            Resource::Annonces
                | Resource::Evenements
                | Resource::Publicites
                | Resource::Documentations
        )
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
