//! Web middleware and shared state
//!
//! Contains:
//! - Application state shared by every handler
//! - Session loading (cookie -> server-side session) and flash toasts
//! - Admin authorization for the dashboard
//! - Error pages for failed handlers

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tera::Context as TeraContext;

use super::flash::{self, Toast};
use crate::backend::{BackendClient, HttpResourceRepository, ReadOnly, Resource};
use crate::cache::create_cache;
use crate::config::Config;
use crate::models::{
    Annonce, AnnonceForm, Documentation, DocumentationForm, Evenement, EvenementForm, Expert,
    Publicite, PubliciteForm, Session, UserInfo,
};
use crate::services::{AuthService, CatalogService, ServiceError, SessionStore};
use crate::views::{PageVars, ViewEngine};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub views: Arc<ViewEngine>,
    pub auth: Arc<AuthService>,
    pub annonces: Arc<CatalogService<Annonce, AnnonceForm>>,
    pub evenements: Arc<CatalogService<Evenement, EvenementForm>>,
    pub publicites: Arc<CatalogService<Publicite, PubliciteForm>>,
    pub documentations: Arc<CatalogService<Documentation, DocumentationForm>>,
    pub experts: Arc<CatalogService<Expert, ReadOnly>>,
    pub users: Arc<CatalogService<UserInfo, ReadOnly>>,
}

impl AppState {
    /// Wire the backend client, caches, services and views from configuration
    pub fn build(config: Config) -> anyhow::Result<Self> {
        let client = Arc::new(BackendClient::new(&config.backend)?);
        tracing::info!(url = %client.base_url(), "Backend client ready");
        let cache = create_cache(&config.cache);
        tracing::debug!(ttl = ?cache.ttl(), "Response cache ready");
        let upload = Arc::new(config.upload.clone());
        let sessions = Arc::new(SessionStore::from_config(&config.session));
        let views = ViewEngine::new(config.views.path.as_deref())?;

        macro_rules! catalog {
            ($resource:expr) => {
                Arc::new(CatalogService::new(
                    HttpResourceRepository::boxed(client.clone(), $resource),
                    cache.clone(),
                    upload.clone(),
                ))
            };
        }

        Ok(Self {
            annonces: catalog!(Resource::Annonces),
            evenements: catalog!(Resource::Evenements),
            publicites: catalog!(Resource::Publicites),
            documentations: catalog!(Resource::Documentations),
            experts: catalog!(Resource::Experts),
            users: catalog!(Resource::Users),
            auth: Arc::new(AuthService::new(client, sessions)),
            views: Arc::new(views),
            config: Arc::new(config),
        })
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.session.cookie_name
    }

    /// `Set-Cookie` value opening the session cookie; it lives as long as the stored session
    pub fn session_cookie(&self, session: &Session) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.cookie_name(),
            session.id,
            self.auth.sessions().ttl().as_secs()
        );
        if self.config.session.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// `Set-Cookie` value removing the session cookie
    pub fn clear_session_cookie(&self) -> String {
        format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", self.cookie_name())
    }
}

/// Who is asking: the signed-in session (if any), the pending toast and the path
#[derive(Debug, Clone, Default)]
pub struct Visitor {
    pub session: Option<Session>,
    pub flash: Option<Toast>,
    pub path: String,
}

impl Visitor {
    /// Backend access token of the signed-in visitor
    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.access_token.as_str())
    }

    pub fn is_admin(&self) -> bool {
        self.session.as_ref().map(Session::is_admin).unwrap_or(false)
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.id.as_str())
    }
}

/// Read a cookie value from the request headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(prefix.as_str()))
        .filter(|value| !value.is_empty())
        .map(String::from)
}

/// Append a `Set-Cookie` header to a response
pub fn append_cookie(response: &mut Response, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::warn!("Dropping invalid cookie header: {}", e),
    }
}

fn sets_cookie(response: &Response, name: &str) -> bool {
    let prefix = format!("{}=", name);
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with(&prefix))
}

/// Session middleware
///
/// Resolves the session cookie, takes the pending flash toast and inserts a
/// [`Visitor`] into the request extensions. Stale session cookies are
/// cleared; the flash cookie is cleared once a page has shown it.
pub async fn load_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let headers = request.headers();
    let session_id = read_cookie(headers, state.cookie_name());
    let flash_present = read_cookie(headers, flash::COOKIE_NAME).is_some();
    let flash = flash::read(headers);

    let session = match &session_id {
        Some(id) => state.auth.sessions().get(id).await,
        None => None,
    };
    let stale_cookie = session_id.is_some() && session.is_none();

    request.extensions_mut().insert(Visitor {
        session,
        flash,
        path,
    });

    let mut response = next.run(request).await;

    if stale_cookie && !sets_cookie(&response, state.cookie_name()) {
        append_cookie(&mut response, &state.clear_session_cookie());
    }
    if flash_present
        && !response.status().is_redirection()
        && !sets_cookie(&response, flash::COOKIE_NAME)
    {
        append_cookie(&mut response, &flash::clear_cookie());
    }
    response
}

/// Dashboard authorization: anything but an admin session goes to the admin login
pub async fn require_admin(request: Request, next: Next) -> Response {
    let is_admin = request
        .extensions()
        .get::<Visitor>()
        .map(Visitor::is_admin)
        .unwrap_or(false);

    if !is_admin {
        tracing::debug!(path = %request.uri().path(), "Dashboard access without admin session");
        return Redirect::to("/admin-login").into_response();
    }
    next.run(request).await
}

/// Error page marker left in the response extensions by [`WebError`]
#[derive(Debug, Clone)]
pub struct ErrorPage {
    pub status: StatusCode,
    pub message: String,
}

/// Handler failures rendered as HTML error pages
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("Page not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::NotFound => StatusCode::NOT_FOUND,
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Service(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            WebError::Service(ServiceError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            WebError::Service(e) if e.is_auth() => StatusCode::FORBIDDEN,
            WebError::Service(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            WebError::NotFound => "La page demandée n'existe pas.".to_string(),
            WebError::BadRequest(message) => message.clone(),
            WebError::Service(e) => e.user_message(),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("{}", self);
        }

        let page = ErrorPage {
            status,
            message: self.user_message(),
        };
        let mut response = (status, page.message.clone()).into_response();
        response.extensions_mut().insert(page);
        response
    }
}

/// Render [`ErrorPage`] responses through the templates
pub async fn render_error_pages(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let visitor = request.extensions().get::<Visitor>().cloned().unwrap_or_default();
    let response = next.run(request).await;

    let Some(page) = response.extensions().get::<ErrorPage>().cloned() else {
        return response;
    };

    let template = if page.status == StatusCode::NOT_FOUND {
        "404.html"
    } else {
        "error.html"
    };
    let mut context = TeraContext::new();
    PageVars::new(&state.config.views.site_name, &visitor.path).insert_into(&mut context);
    super::page::insert_visitor(&mut context, &visitor, None);
    context.insert("status", &page.status.as_u16());
    context.insert("error_message", &page.message);

    let html = state.views.render_with_fallback(template, &context);
    let mut rendered = (page.status, axum::response::Html(html)).into_response();
    for cookie in response.headers().get_all(header::SET_COOKIE) {
        rendered.headers_mut().append(header::SET_COOKIE, cookie.clone());
    }
    rendered
}
