//! Admin dashboard
//!
//! Statistics plus one manager per editable collection (events, documents,
//! ads) and a read-only users tab. Every route here sits behind
//! `require_admin`.

use axum::{
    extract::{Multipart, Path, Query, State},
    response::Response,
    Extension,
};
use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::flash::Toast;
use super::forms::read_multipart;
use super::middleware::{AppState, Visitor, WebError};
use super::page::{redirect_with, Page};
use crate::models::{
    DocumentCategory, Documentation, DocumentationForm, EventCategory, EventTag, Evenement,
    EvenementForm, FormFields, PubliciteForm, UserInfo,
};
use crate::services::{CatalogForm, CatalogService, DashboardStats, ListingFilter, ServiceError};

/// Dashboard tabs, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Events,
    Documents,
    Ads,
    Users,
}

impl Tab {
    const ALL: [Tab; 4] = [Tab::Events, Tab::Documents, Tab::Ads, Tab::Users];

    fn slug(self) -> &'static str {
        match self {
            Tab::Events => "evenements",
            Tab::Documents => "documentations",
            Tab::Ads => "publicites",
            Tab::Users => "utilisateurs",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Tab::Events => "Événements",
            Tab::Documents => "Documents",
            Tab::Ads => "Publicités",
            Tab::Users => "Utilisateurs",
        }
    }

    fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.slug() == slug)
    }

    /// Collection managed from this tab; the users tab is read-only
    fn manager(self) -> Option<Manager> {
        match self {
            Tab::Events => Some(Manager::Events),
            Tab::Documents => Some(Manager::Documents),
            Tab::Ads => Some(Manager::Ads),
            Tab::Users => None,
        }
    }

    fn location(self) -> String {
        format!("/dashboard?tab={}", self.slug())
    }
}

/// Collections the dashboard can write to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Manager {
    Events,
    Documents,
    Ads,
}

impl Manager {
    fn tab(self) -> Tab {
        match self {
            Manager::Events => Tab::Events,
            Manager::Documents => Tab::Documents,
            Manager::Ads => Tab::Ads,
        }
    }

    fn messages(self) -> Messages {
        match self {
            Manager::Events => Messages {
                created: "Événement créé avec succès",
                updated: "Événement mis à jour avec succès",
                deleted: "Événement supprimé avec succès",
            },
            Manager::Documents => Messages {
                created: "Document créé avec succès",
                updated: "Document mis à jour avec succès",
                deleted: "Document supprimé avec succès",
            },
            Manager::Ads => Messages {
                created: "Publicité créée avec succès",
                updated: "Publicité mise à jour avec succès",
                deleted: "Publicité supprimée avec succès",
            },
        }
    }
}

#[derive(Serialize)]
struct TabLink {
    slug: &'static str,
    label: &'static str,
}

/// Outcome messages of a manager
struct Messages {
    created: &'static str,
    updated: &'static str,
    deleted: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub tab: Option<String>,
    pub q: Option<String>,
    pub edit: Option<String>,
}

#[derive(Serialize)]
struct EventRow<'a> {
    #[serde(flatten)]
    event: &'a Evenement,
    category_label: &'static str,
    schedule: String,
}

#[derive(Serialize)]
struct DocumentRow<'a> {
    #[serde(flatten)]
    document: &'a Documentation,
    category_label: &'static str,
    summary: String,
}

#[derive(Serialize)]
struct UserRow<'a> {
    #[serde(flatten)]
    user: &'a UserInfo,
    display_name: String,
}

/// Records of the open tab matching the search box, in backend order
fn search<T: crate::services::Searchable + Clone>(items: &[T], q: Option<&str>) -> Vec<T> {
    ListingFilter::new(None, q).apply(items.to_vec())
}

fn loaded<T>(result: Result<Vec<T>, ServiceError>, what: &str, errors: &mut Vec<String>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!("Dashboard failed to load {}: {}", what, e);
            errors.push(e.user_message());
            Vec::new()
        }
    }
}

/// GET /dashboard?tab=&q=&edit=
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let tab = query
        .tab
        .as_deref()
        .and_then(Tab::from_slug)
        .unwrap_or(Tab::Events);
    let q = query.q.as_deref().map(str::trim).unwrap_or("");
    let edit_id = query.edit.as_deref().and_then(|id| id.parse::<i64>().ok());

    let mut load_errors = Vec::new();
    let events = loaded(state.evenements.list(None).await, "evenements", &mut load_errors);
    let documents = loaded(state.documentations.list(None).await, "documentations", &mut load_errors);
    let ads = loaded(state.publicites.list(None).await, "publicites", &mut load_errors);

    let stats = DashboardStats::compute(&events, &documents, &ads, Utc::now().date_naive());
    let tabs: Vec<_> = Tab::ALL
        .iter()
        .map(|tab| TabLink {
            slug: tab.slug(),
            label: tab.label(),
        })
        .collect();

    let mut page = Page::new("admin/dashboard.html")
        .with("stats", &stats)
        .with("tabs", &tabs)
        .with("tab", tab.slug())
        .with("editable", &tab.manager().is_some())
        .with("q", q)
        .with("event_categories", &EventCategory::writable_options())
        .with("event_tags", &EventTag::options())
        .with("document_categories", &DocumentCategory::options());

    let mut missing_edit = false;
    let filter = (!q.is_empty()).then_some(q);
    match tab {
        Tab::Events => {
            let rows = search(&events, filter);
            let rows: Vec<_> = rows
                .iter()
                .map(|event| EventRow {
                    event,
                    category_label: event.category.label(),
                    schedule: event.schedule(),
                })
                .collect();
            page = page.with("rows", &rows);
            if let Some(id) = edit_id {
                match events.iter().find(|e| e.id == id) {
                    Some(event) => page = page.with("editing", &EvenementForm::from_event(event)),
                    None => missing_edit = true,
                }
            }
        }
        Tab::Documents => {
            let rows = search(&documents, filter);
            let rows: Vec<_> = rows
                .iter()
                .map(|document| DocumentRow {
                    document,
                    category_label: document.category.label(),
                    summary: document.summary(),
                })
                .collect();
            page = page.with("rows", &rows);
            if let Some(id) = edit_id {
                match documents.iter().find(|d| d.id == id) {
                    Some(doc) => page = page.with("editing", &DocumentationForm::from_document(doc)),
                    None => missing_edit = true,
                }
            }
        }
        Tab::Ads => {
            page = page.with("rows", &search(&ads, filter));
            if let Some(id) = edit_id {
                match ads.iter().find(|a| a.id == id) {
                    Some(ad) => page = page.with("editing", &PubliciteForm::from_ad(ad)),
                    None => missing_edit = true,
                }
            }
        }
        Tab::Users => {
            let users = loaded(state.users.list(visitor.token()).await, "users", &mut load_errors);
            let rows = search(&users, filter);
            let rows: Vec<_> = rows
                .iter()
                .map(|user| UserRow {
                    user,
                    display_name: user.display_name(),
                })
                .collect();
            page = page.with("rows", &rows);
        }
    }

    if let Some(id) = edit_id.filter(|_| !missing_edit) {
        page = page.with("editing_id", &id);
    }
    if missing_edit {
        page = page.toast(Toast::error("Erreur", "Élément introuvable."));
    }
    page.with("load_errors", &load_errors).render(&state, &visitor)
}

fn manager_for(kind: &str) -> Result<Manager, WebError> {
    Tab::from_slug(kind)
        .and_then(Tab::manager)
        .ok_or(WebError::NotFound)
}

fn parse_id(raw: &str) -> Result<i64, WebError> {
    raw.parse().map_err(|_| WebError::NotFound)
}

async fn save<T, F>(
    catalog: &CatalogService<T, F>,
    id: Option<i64>,
    form: F,
    token: Option<&str>,
) -> Result<(), ServiceError>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
    F: CatalogForm + 'static,
{
    match id {
        Some(id) => catalog.update(id, &form, token).await.map(|_| ()),
        None => catalog.create(&form, token).await.map(|_| ()),
    }
}

async fn save_fields(
    state: &AppState,
    manager: Manager,
    id: Option<i64>,
    fields: FormFields,
    token: Option<&str>,
) -> Result<(), ServiceError> {
    match manager {
        Manager::Events => save(&state.evenements, id, EvenementForm::from_fields(fields), token).await,
        Manager::Documents => {
            save(&state.documentations, id, DocumentationForm::from_fields(fields), token).await
        }
        Manager::Ads => save(&state.publicites, id, PubliciteForm::from_fields(fields), token).await,
    }
}

/// Redirect after a write; an expired backend token ends the admin session
async fn finish(
    state: &AppState,
    visitor: &Visitor,
    result: Result<(), ServiceError>,
    success: &str,
    back: String,
) -> Response {
    match result {
        Ok(()) => redirect_with(&back, Some(Toast::success("Succès", success)), &[]),
        Err(e) if e.is_auth() => {
            tracing::warn!("Dashboard write rejected by the backend: {}", e);
            if let Some(id) = visitor.session_id() {
                state.auth.logout(id).await;
            }
            let toast = Toast::error("Session expirée", "Veuillez vous reconnecter.");
            redirect_with("/admin-login", Some(toast), &[state.clear_session_cookie()])
        }
        Err(e) => {
            tracing::warn!("Dashboard write failed: {}", e);
            redirect_with(&back, Some(Toast::from_error(&e)), &[])
        }
    }
}

/// POST /dashboard/{kind}
pub async fn create(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
    Path(kind): Path<String>,
    multipart: Multipart,
) -> Result<Response, WebError> {
    let manager = manager_for(&kind)?;
    let fields = read_multipart(multipart).await?;
    let result = save_fields(&state, manager, None, fields, visitor.token()).await;
    let back = manager.tab().location();
    Ok(finish(&state, &visitor, result, manager.messages().created, back).await)
}

/// POST /dashboard/{kind}/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
    Path((kind, id)): Path<(String, String)>,
    multipart: Multipart,
) -> Result<Response, WebError> {
    let manager = manager_for(&kind)?;
    let id = parse_id(&id)?;
    let fields = read_multipart(multipart).await?;
    let result = save_fields(&state, manager, Some(id), fields, visitor.token()).await;

    let back = if result.is_ok() {
        manager.tab().location()
    } else {
        format!("{}&edit={}", manager.tab().location(), id)
    };
    Ok(finish(&state, &visitor, result, manager.messages().updated, back).await)
}

/// POST /dashboard/{kind}/{id}/delete
pub async fn delete(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Response, WebError> {
    let manager = manager_for(&kind)?;
    let id = parse_id(&id)?;
    let token = visitor.token();
    let result = match manager {
        Manager::Events => state.evenements.delete(id, token).await,
        Manager::Documents => state.documentations.delete(id, token).await,
        Manager::Ads => state.publicites.delete(id, token).await,
    };
    let back = manager.tab().location();
    Ok(finish(&state, &visitor, result, manager.messages().deleted, back).await)
}
