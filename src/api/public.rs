//! Public pages: home, listings, experts, documentation and events

use axum::{
    extract::{Multipart, Path, Query, State},
    response::Response,
    Extension,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::flash::Toast;
use super::forms::read_multipart;
use super::middleware::{AppState, Visitor, WebError};
use super::page::{redirect_with, Page};
use crate::models::{
    Annonce, AnnonceCategory, AnnonceForm, DocumentCategory, Documentation, EventCategory,
    Evenement, Expert, ExpertService, Publicite,
};
use crate::services::{ListingFilter, ServiceError};

/// Filter parameters shared by the list pages
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub categorie: Option<String>,
    pub service: Option<String>,
    pub q: Option<String>,
}

impl ListingQuery {
    fn filter(&self) -> ListingFilter {
        let category = self.categorie.as_deref().or(self.service.as_deref());
        ListingFilter::new(category, self.q.as_deref())
    }

    fn selected(&self) -> &str {
        self.categorie
            .as_deref()
            .or(self.service.as_deref())
            .map(str::trim)
            .unwrap_or("")
    }

    fn search(&self) -> &str {
        self.q.as_deref().map(str::trim).unwrap_or("")
    }
}

/// Split a list result into records and an inline error message
fn or_inline_error<T>(result: Result<Vec<T>, ServiceError>, what: &str) -> (Vec<T>, Option<String>) {
    match result {
        Ok(items) => (items, None),
        Err(e) => {
            tracing::warn!("Failed to load {}: {}", what, e);
            (Vec::new(), Some(e.user_message()))
        }
    }
}

/// `mailto:` for e-mail contacts, `tel:` for phone numbers
fn contact_href(contact: &str) -> Option<String> {
    let contact = contact.trim();
    if contact.is_empty() {
        None
    } else if contact.contains('@') {
        Some(format!("mailto:{}", contact))
    } else {
        let number: String = contact
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        (!number.is_empty()).then(|| format!("tel:{}", number))
    }
}

#[derive(Serialize)]
struct AnnonceCard<'a> {
    #[serde(flatten)]
    annonce: &'a Annonce,
    category_label: &'static str,
    is_recent: bool,
    attachment_name: Option<&'a str>,
    contact_href: Option<String>,
}

impl<'a> AnnonceCard<'a> {
    fn new(annonce: &'a Annonce) -> Self {
        Self {
            annonce,
            category_label: annonce.category.label(),
            is_recent: annonce.is_recent(Utc::now()),
            attachment_name: annonce.attachment_name(),
            contact_href: contact_href(&annonce.contact),
        }
    }
}

#[derive(Serialize)]
struct EventCard<'a> {
    #[serde(flatten)]
    event: &'a Evenement,
    category_label: &'static str,
    tag_label: &'static str,
    schedule: String,
    is_ongoing: bool,
}

impl<'a> EventCard<'a> {
    fn new(event: &'a Evenement) -> Self {
        Self {
            event,
            category_label: event.category.label(),
            tag_label: event.tags.label(),
            schedule: event.schedule(),
            is_ongoing: event.is_ongoing(Utc::now()),
        }
    }
}

#[derive(Serialize)]
struct DocumentCard<'a> {
    #[serde(flatten)]
    document: &'a Documentation,
    category_label: &'static str,
    summary: String,
}

#[derive(Serialize)]
struct ExpertCard<'a> {
    #[serde(flatten)]
    expert: &'a Expert,
    display_name: String,
    initials: String,
    service_label: &'static str,
}

#[derive(Serialize)]
struct AdCard<'a> {
    #[serde(flatten)]
    ad: &'a Publicite,
    contact_href: Option<String>,
}

fn ad_cards(ads: &[Publicite]) -> Vec<AdCard<'_>> {
    ads.iter()
        .map(|ad| AdCard {
            ad,
            contact_href: ad.contact.as_deref().and_then(contact_href),
        })
        .collect()
}

/// GET / and /accueil
pub async fn home(State(state): State<AppState>, Extension(visitor): Extension<Visitor>) -> Response {
    let (ads, _) = or_inline_error(state.publicites.list(None).await, "publicites");

    Page::new("index.html")
        .with("services", &ExpertService::options())
        .with("ads", &ad_cards(&ads))
        .render(&state, &visitor)
}

/// GET /annonces?categorie=&q=
pub async fn annonces(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
    Query(query): Query<ListingQuery>,
) -> Response {
    let (items, load_error) = or_inline_error(state.annonces.list(None).await, "annonces");
    let items = query.filter().apply(items);
    let cards: Vec<_> = items.iter().map(AnnonceCard::new).collect();

    Page::new("annonces/list.html")
        .with("annonces", &cards)
        .with("filter_param", "categorie")
        .with("filter_options", &AnnonceCategory::options())
        .with("selected", query.selected())
        .with("q", query.search())
        .with("load_error", &load_error)
        .render(&state, &visitor)
}

/// GET /annonces/{id}
pub async fn annonce_detail(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let id: i64 = id.parse().map_err(|_| WebError::NotFound)?;
    let annonce = state.annonces.get(id, None).await?;

    Ok(Page::new("annonces/detail.html")
        .with("annonce", &AnnonceCard::new(&annonce))
        .render(&state, &visitor))
}

/// POST /annonces - publish with an optional attachment
pub async fn publish_annonce(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
    multipart: Multipart,
) -> Result<Response, WebError> {
    let Some(token) = visitor.token() else {
        let toast = Toast::error("Connexion requise", "Connectez-vous pour publier une annonce.");
        return Ok(redirect_with("/connexion", Some(toast), &[]));
    };

    let form = AnnonceForm::from_fields(read_multipart(multipart).await?);
    match state.annonces.create(&form, Some(token)).await {
        Ok(annonce) => {
            let toast = Toast::success("Annonce publiée", "Votre annonce a été publiée avec succès.");
            Ok(redirect_with(&format!("/annonces/{}", annonce.id), Some(toast), &[]))
        }
        Err(e) => {
            tracing::warn!("Annonce not published: {}", e);
            Ok(redirect_with("/annonces", Some(Toast::from_error(&e)), &[]))
        }
    }
}

/// GET /profils?service=&q= - the backend only lists experts to signed-in visitors
pub async fn profils(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
    Query(query): Query<ListingQuery>,
) -> Response {
    let page = Page::new("profils.html")
        .with("filter_param", "service")
        .with("filter_options", &ExpertService::options())
        .with("selected", query.selected())
        .with("q", query.search());

    let Some(token) = visitor.token() else {
        return page.with("requires_login", &true).render(&state, &visitor);
    };

    match state.experts.list(Some(token)).await {
        Ok(experts) => {
            let experts = query.filter().apply(experts);
            let cards: Vec<_> = experts
                .iter()
                .map(|expert| ExpertCard {
                    expert,
                    display_name: expert.display_name(),
                    initials: expert.initials(),
                    service_label: expert.service.label(),
                })
                .collect();
            page.with("experts", &cards).render(&state, &visitor)
        }
        Err(e) if e.is_auth() => page
            .with("requires_login", &true)
            .with("load_error", "Votre compte n'a pas accès aux profils d'experts.")
            .render(&state, &visitor),
        Err(e) => {
            tracing::warn!("Failed to load experts: {}", e);
            page.with("load_error", &e.user_message()).render(&state, &visitor)
        }
    }
}

/// GET /documentation?categorie=&q=
pub async fn documentation(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
    Query(query): Query<ListingQuery>,
) -> Response {
    let (items, load_error) =
        or_inline_error(state.documentations.list(None).await, "documentations");
    let items = query.filter().apply(items);
    let cards: Vec<_> = items
        .iter()
        .map(|document| DocumentCard {
            document,
            category_label: document.category.label(),
            summary: document.summary(),
        })
        .collect();

    Page::new("documentation.html")
        .with("documents", &cards)
        .with("filter_param", "categorie")
        .with("filter_options", &DocumentCategory::options())
        .with("selected", query.selected())
        .with("q", query.search())
        .with("load_error", &load_error)
        .render(&state, &visitor)
}

/// Next events after today, soonest first
fn upcoming(events: &[Evenement], limit: usize) -> Vec<&Evenement> {
    let today = Utc::now().date_naive();
    let mut upcoming: Vec<_> = events.iter().filter(|e| e.is_upcoming(today)).collect();
    upcoming.sort_by_key(|e| (e.date, e.starts_at));
    upcoming.truncate(limit);
    upcoming
}

/// GET /actualites?categorie=&q=
pub async fn actualites(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
    Query(query): Query<ListingQuery>,
) -> Response {
    let (events, load_error) = or_inline_error(state.evenements.list(None).await, "evenements");
    let (ads, _) = or_inline_error(state.publicites.list(None).await, "publicites");

    let next: Vec<_> = upcoming(&events, 3).into_iter().map(EventCard::new).collect();
    let filtered = query.filter().apply(events.clone());
    let cards: Vec<_> = filtered.iter().map(EventCard::new).collect();

    Page::new("actualites.html")
        .with("events", &cards)
        .with("upcoming", &next)
        .with("ads", &ad_cards(&ads))
        .with("filter_param", "categorie")
        .with("filter_options", &EventCategory::options())
        .with("selected", query.selected())
        .with("q", query.search())
        .with("load_error", &load_error)
        .render(&state, &visitor)
}

/// Fallback for unknown paths
pub async fn not_found() -> WebError {
    WebError::NotFound
}
