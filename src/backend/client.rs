//! HTTP client for the backend REST API
//!
//! A thin wrapper over `reqwest` that resolves paths against the configured
//! base URL, attaches the bearer token when one is given, and turns error
//! responses into [`BackendError`] with the backend's own message.

use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::{extract_detail, BackendError};
use super::Resource;
use crate::config::BackendConfig;
use crate::models::{Role, SignupPayload};

/// Tokens returned by `POST token/`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

/// Collections come back either bare or wrapped by the paginator
#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Plain(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> ListBody<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListBody::Plain(items) | ListBody::Paged { results: items } => items,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let base = config.normalized_base_url();
        let base_url = Url::parse(&base).map_err(|e| BackendError::InvalidUrl(format!("{}: {}", base, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(BackendError::InvalidUrl(base));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Build a request, with `Authorization: Bearer` only when a token is present
    fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> Result<RequestBuilder, BackendError> {
        let builder = self.http.request(method, self.url(path)?);
        Ok(match token.filter(|t| !t.is_empty()) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, BackendError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body);
        tracing::debug!(status = status.as_u16(), detail = %detail, "Backend request failed");
        Err(BackendError::Status {
            status: status.as_u16(),
            detail,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, BackendError> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Exchange credentials for an access/refresh token pair
    pub async fn obtain_token(&self, username: &str, password: &str) -> Result<TokenPair, BackendError> {
        let builder = self
            .request(Method::POST, "token/", None)?
            .json(&Credentials { username, password });
        self.send_json(builder).await
    }

    /// Create an account; the backend answers with a confirmation message only
    pub async fn signup(&self, payload: &SignupPayload) -> Result<(), BackendError> {
        let builder = self.request(Method::POST, "signup/", None)?.json(payload);
        self.send(builder).await?;
        Ok(())
    }

    pub async fn list<T: DeserializeOwned>(
        &self,
        resource: Resource,
        token: Option<&str>,
    ) -> Result<Vec<T>, BackendError> {
        let builder = self.request(Method::GET, &resource.collection_path(), token)?;
        let body: ListBody<T> = self.send_json(builder).await?;
        Ok(body.into_vec())
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        resource: Resource,
        id: i64,
        token: Option<&str>,
    ) -> Result<T, BackendError> {
        let builder = self.request(Method::GET, &resource.item_path(id), token)?;
        self.send_json(builder).await
    }

    pub async fn create<T: DeserializeOwned>(
        &self,
        resource: Resource,
        form: Form,
        token: Option<&str>,
    ) -> Result<T, BackendError> {
        let builder = self
            .request(Method::POST, &resource.collection_path(), token)?
            .multipart(form);
        self.send_json(builder).await
    }

    pub async fn update<T: DeserializeOwned>(
        &self,
        resource: Resource,
        id: i64,
        form: Form,
        token: Option<&str>,
    ) -> Result<T, BackendError> {
        let builder = self
            .request(Method::PUT, &resource.item_path(id), token)?
            .multipart(form);
        self.send_json(builder).await
    }

    pub async fn delete(&self, resource: Resource, id: i64, token: Option<&str>) -> Result<(), BackendError> {
        let builder = self.request(Method::DELETE, &resource.item_path(id), token)?;
        self.send(builder).await?;
        Ok(())
    }
}
