//! Catalog service
//!
//! One generic service per backend collection: lists (cached for public
//! collections), single records, and validated create/update/delete that
//! drop the collection's cache entries.

use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use super::ServiceError;
use crate::backend::{ReadOnly, Resource, ResourceRepository};
use crate::cache::{list_key, resource_prefix, MemoryCache};
use crate::config::UploadConfig;
use crate::models::{AnnonceForm, DocumentationForm, EvenementForm, FieldError, PubliciteForm};

/// A form accepted by a catalog
pub trait CatalogForm: Send + Sync {
    fn validate_form(&self, upload: &UploadConfig) -> Vec<FieldError>;
}

impl CatalogForm for AnnonceForm {
    fn validate_form(&self, upload: &UploadConfig) -> Vec<FieldError> {
        self.validate(upload)
    }
}

impl CatalogForm for EvenementForm {
    fn validate_form(&self, upload: &UploadConfig) -> Vec<FieldError> {
        self.validate(upload)
    }
}

impl CatalogForm for PubliciteForm {
    fn validate_form(&self, upload: &UploadConfig) -> Vec<FieldError> {
        self.validate(upload)
    }
}

impl CatalogForm for DocumentationForm {
    fn validate_form(&self, _upload: &UploadConfig) -> Vec<FieldError> {
        self.validate()
    }
}

impl CatalogForm for ReadOnly {
    fn validate_form(&self, _upload: &UploadConfig) -> Vec<FieldError> {
        match *self {}
    }
}

pub struct CatalogService<T, F> {
    repo: Arc<dyn ResourceRepository<T, F>>,
    cache: Arc<MemoryCache>,
    upload: Arc<UploadConfig>,
}

impl<T, F> CatalogService<T, F>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
    F: CatalogForm + 'static,
{
    pub fn new(
        repo: Arc<dyn ResourceRepository<T, F>>,
        cache: Arc<MemoryCache>,
        upload: Arc<UploadConfig>,
    ) -> Self {
        Self { repo, cache, upload }
    }

    pub fn resource(&self) -> Resource {
        self.repo.resource()
    }

    /// All records. Public collections are served from the cache when fresh.
    pub async fn list(&self, token: Option<&str>) -> Result<Vec<T>, ServiceError> {
        let resource = self.resource();
        if !resource.is_public() {
            return Ok(self.repo.list(token).await?);
        }

        let key = list_key(resource.name());
        match self.cache.get::<Vec<T>>(&key).await {
            Ok(Some(items)) => return Ok(items),
            Ok(None) => {}
            Err(e) => tracing::warn!(resource = %resource, "Ignoring unreadable cache entry: {}", e),
        }

        let items = self.repo.list(token).await?;
        if let Err(e) = self.cache.set(&key, &items).await {
            tracing::warn!(resource = %resource, "Failed to cache list: {}", e);
        }
        Ok(items)
    }

    pub async fn get(&self, id: i64, token: Option<&str>) -> Result<T, ServiceError> {
        Ok(self.repo.get(id, token).await?)
    }

    pub async fn create(&self, form: &F, token: Option<&str>) -> Result<T, ServiceError> {
        self.check(form)?;
        let record = self.repo.create(form, token).await?;
        self.invalidate().await;
        tracing::info!(resource = %self.resource(), "Record created");
        Ok(record)
    }

    pub async fn update(&self, id: i64, form: &F, token: Option<&str>) -> Result<T, ServiceError> {
        self.check(form)?;
        let record = self.repo.update(id, form, token).await?;
        self.invalidate().await;
        tracing::info!(resource = %self.resource(), id, "Record updated");
        Ok(record)
    }

    pub async fn delete(&self, id: i64, token: Option<&str>) -> Result<(), ServiceError> {
        self.repo.delete(id, token).await?;
        self.invalidate().await;
        tracing::info!(resource = %self.resource(), id, "Record deleted");
        Ok(())
    }

    fn check(&self, form: &F) -> Result<(), ServiceError> {
        let errors = form.validate_form(&self.upload);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Validation(errors))
        }
    }

    async fn invalidate(&self) {
        let dropped = self.cache.delete_prefix(&resource_prefix(self.resource().name())).await;
        tracing::debug!(resource = %self.resource(), dropped, "Cache invalidated");
    }
}
