//! Resource repository

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;

use super::client::BackendClient;
use super::error::BackendError;
use super::payload::FormPayload;
use super::Resource;

/// CRUD access to one backend collection.
///
/// `T` is the record read back, `F` the form written.
#[async_trait]
pub trait ResourceRepository<T, F>: Send + Sync {
    fn resource(&self) -> Resource;
    async fn list(&self, token: Option<&str>) -> Result<Vec<T>, BackendError>;
    async fn get(&self, id: i64, token: Option<&str>) -> Result<T, BackendError>;
    async fn create(&self, form: &F, token: Option<&str>) -> Result<T, BackendError>;
    async fn update(&self, id: i64, form: &F, token: Option<&str>) -> Result<T, BackendError>;
    async fn delete(&self, id: i64, token: Option<&str>) -> Result<(), BackendError>;
}

pub struct HttpResourceRepository<T, F> {
    client: Arc<BackendClient>,
    resource: Resource,
    _marker: PhantomData<fn() -> (T, F)>,
}

impl<T, F> HttpResourceRepository<T, F>
where
    T: DeserializeOwned + Send + 'static,
    F: FormPayload + 'static,
{
    pub fn new(client: Arc<BackendClient>, resource: Resource) -> Self {
        Self {
            client,
            resource,
            _marker: PhantomData,
        }
    }

    pub fn boxed(client: Arc<BackendClient>, resource: Resource) -> Arc<dyn ResourceRepository<T, F>> {
        Arc::new(Self::new(client, resource))
    }
}

#[async_trait]
impl<T, F> ResourceRepository<T, F> for HttpResourceRepository<T, F>
where
    T: DeserializeOwned + Send + 'static,
    F: FormPayload + 'static,
{
    fn resource(&self) -> Resource {
        self.resource
    }

    async fn list(&self, token: Option<&str>) -> Result<Vec<T>, BackendError> {
        self.client.list(self.resource, token).await
    }

    async fn get(&self, id: i64, token: Option<&str>) -> Result<T, BackendError> {
        self.client.get(self.resource, id, token).await
    }

    async fn create(&self, form: &F, token: Option<&str>) -> Result<T, BackendError> {
        let body = form.to_multipart()?;
        self.client.create(self.resource, body, token).await
    }

    async fn update(&self, id: i64, form: &F, token: Option<&str>) -> Result<T, BackendError> {
        let body = form.to_multipart()?;
        self.client.update(self.resource, id, body, token).await
    }

    async fn delete(&self, id: i64, token: Option<&str>) -> Result<(), BackendError> {
        self.client.delete(self.resource, id, token).await
    }
}
