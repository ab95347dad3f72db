//! In-process fake of the backend REST API for tests
//!
//! Serves the same paths as the real backend on an ephemeral port, keeps
//! records in memory and remembers every request it received.

use axum::{
    extract::{Multipart, Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::BackendConfig;

pub const ADMIN_TOKEN: &str = "token-admin";
pub const MEMBER_TOKEN: &str = "token-awa";

/// A request seen by the fake backend
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Default)]
struct FakeState {
    records: Mutex<HashMap<String, Vec<Value>>>,
    requests: Mutex<Vec<Recorded>>,
    revoked: Mutex<Vec<String>>,
    next_id: Mutex<i64>,
}

pub struct FakeBackend {
    pub base_url: String,
    state: Arc<FakeState>,
}

impl FakeBackend {
    pub async fn spawn() -> Self {
        let state = Arc::new(FakeState::default());
        *state.next_id.lock().unwrap() = 100;
        seed(&state);

        let app = Router::new()
            .route("/api/token/", post(token))
            .route("/api/signup/", post(signup))
            .route("/api/{collection}/", get(list).post(create))
            .route(
                "/api/{collection}/{id}/",
                get(fetch).put(update).delete(remove),
            )
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api/", addr),
            state,
        }
    }

    pub fn config(&self) -> BackendConfig {
        BackendConfig {
            base_url: self.base_url.clone(),
            timeout_seconds: 5,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Requests whose path starts with `/api/<prefix>`
    pub fn requests_to(&self, prefix: &str) -> Vec<Recorded> {
        let full = format!("/api/{}", prefix);
        self.requests()
            .into_iter()
            .filter(|r| r.path.starts_with(&full))
            .collect()
    }

    pub fn records(&self, collection: &str) -> Vec<Value> {
        self.state
            .records
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Answer 401 to this access token from now on, as an expired token
    pub fn revoke(&self, token: &str) {
        self.state.revoked.lock().unwrap().push(token.to_string());
    }

    pub fn insert(&self, collection: &str, record: Value) {
        self.state
            .records
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(record);
    }
}

/// Config pointing at a port nothing listens on
pub fn unreachable_config() -> BackendConfig {
    BackendConfig {
        base_url: "http://127.0.0.1:9/api/".to_string(),
        timeout_seconds: 2,
    }
}

fn seed(state: &FakeState) {
    let mut records = state.records.lock().unwrap();
    records.insert(
        "annonces".to_string(),
        vec![
            json!({
                "id": 1,
                "auteur": "Apporteur: moussa",
                "titre": "Recherche investisseur pour projet agricole",
                "description": "Projet d'agriculture moderne au Sénégal",
                "categorie": "opportunites_affaires",
                "date_publication": "2024-01-15T10:00:00Z",
                "pieces_jointes": null,
                "contact": "+221 77 123 45 67"
            }),
            json!({
                "id": 2,
                "auteur": "Apporteur: fatou",
                "titre": "Services de transit et dédouanement",
                "description": "Transitaire agréé au port d'Abidjan",
                "categorie": "offres_services",
                "date_publication": "2024-01-14T09:00:00Z",
                "pieces_jointes": "http://127.0.0.1:8000/media/annonces/tarifs.pdf",
                "contact": "transit@example.com"
            }),
        ],
    );
    records.insert(
        "evenements".to_string(),
        vec![
            json!({
                "id": 1,
                "titre": "Salon de l'Agriculture",
                "description": "Exposants du secteur agricole",
                "date": "2099-03-15",
                "heure_debut": "09:00:00",
                "heure_fin": "18:00:00",
                "lieu": "Dakar",
                "categorie": "conference",
                "tags": "agricultur",
                "lien_inscription": "https://salon.example.com",
                "image_url": null
            }),
            json!({
                "id": 2,
                "titre": "Atelier export",
                "description": "Formalités d'exportation",
                "date": "2020-02-10",
                "heure_debut": "10:00:00",
                "heure_fin": "12:00:00",
                "lieu": "Abidjan",
                "categorie": "atelier",
                "tags": "autre",
                "lien_inscription": "",
                "image_url": null
            }),
        ],
    );
    records.insert(
        "publicites".to_string(),
        vec![json!({
            "id": 1,
            "titre": "Crédit PME",
            "contenu": "Financement jusqu'à 50 millions",
            "badge": "Nouveau",
            "lien": "https://banque.example.com",
            "contact": "credit@banque.example.com",
            "date_publication": "2024-02-01T08:00:00Z",
            "image": null
        })],
    );
    records.insert(
        "documentations".to_string(),
        vec![
            json!({
                "id": 1,
                "titre": "Guide de l'exportateur",
                "categorie": "commerciale",
                "contenu": "Toutes les étapes pour exporter vos produits",
                "lien": "https://docs.example.com/export.pdf"
            }),
            json!({
                "id": 2,
                "titre": "Modèle de contrat",
                "categorie": "juridique",
                "contenu": "Contrat type de partenariat commercial",
                "lien": null
            }),
        ],
    );
    records.insert(
        "experts".to_string(),
        vec![
            json!({
                "id": 1,
                "user": {"id": 10, "username": "moussa", "first_name": "Moussa", "last_name": "Diop", "email": "moussa@example.com"},
                "duree_experience": 12,
                "specialite": "Commerce international",
                "localisation": "Dakar",
                "services_proposes": "dedouanement"
            }),
            json!({
                "id": 2,
                "user": {"id": 11, "username": "aminata", "first_name": "Aminata", "last_name": "Kone", "email": "aminata@example.com"},
                "duree_experience": 7,
                "specialite": "Droit des affaires",
                "localisation": "Abidjan",
                "services_proposes": "conseil_juridique"
            }),
        ],
    );
    records.insert(
        "users".to_string(),
        vec![
            json!({"id": 1, "username": "admin", "first_name": "", "last_name": "", "email": "admin@example.com"}),
            json!({"id": 2, "username": "awa", "first_name": "Awa", "last_name": "Ndiaye", "email": "awa@example.com"}),
        ],
    );
}

async fn record(State(state): State<Arc<FakeState>>, request: Request, next: Next) -> Response {
    let recorded = {
        let header_value = |name: header::HeaderName| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        Recorded {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            authorization: header_value(header::AUTHORIZATION),
            content_type: header_value(header::CONTENT_TYPE),
        }
    };
    state.requests.lock().unwrap().push(recorded);
    next.run(request).await
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(String::from)
}

/// A bearer token that has not been revoked
fn authorized(state: &FakeState, headers: &HeaderMap) -> bool {
    match bearer(headers) {
        Some(token) => !state.revoked.lock().unwrap().contains(&token),
        None => false,
    }
}

fn error(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn unauthenticated() -> Response {
    error(
        StatusCode::UNAUTHORIZED,
        json!({"detail": "Authentication credentials were not provided."}),
    )
}

async fn token(Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    match (username, password) {
        ("admin", "secret") => Json(json!({
            "access": ADMIN_TOKEN,
            "refresh": "refresh-admin",
            "role": "admin"
        }))
        .into_response(),
        ("awa", "secret") => Json(json!({
            "access": MEMBER_TOKEN,
            "refresh": "refresh-awa",
            "role": "chercheur",
            "first_name": "Awa",
            "last_name": "Ndiaye"
        }))
        .into_response(),
        _ => error(
            StatusCode::UNAUTHORIZED,
            json!({"detail": "No active account found with the given credentials"}),
        ),
    }
}

async fn signup(Json(body): Json<Value>) -> Response {
    if body["user"]["username"] == "taken" {
        return error(
            StatusCode::BAD_REQUEST,
            json!({"user": {"username": ["A user with that username already exists."]}}),
        );
    }
    match body["role"].as_str() {
        Some(role @ ("apporteur" | "chercheur" | "expert" | "admin")) => (
            StatusCode::CREATED,
            Json(json!({"message": format!("Compte {} créé avec succès", role)})),
        )
            .into_response(),
        _ => error(StatusCode::BAD_REQUEST, json!({"error": "Rôle invalide"})),
    }
}

fn protected(collection: &str) -> bool {
    matches!(collection, "experts" | "users")
}

async fn list(
    State(state): State<Arc<FakeState>>,
    Path(collection): Path<String>,
    headers: HeaderMap,
) -> Response {
    if protected(&collection) && !authorized(&state, &headers) {
        return unauthenticated();
    }
    let items = state
        .records
        .lock()
        .unwrap()
        .get(&collection)
        .cloned()
        .unwrap_or_default();

    // documentations go through the paginator, the rest come back bare
    if collection == "documentations" {
        Json(json!({"count": items.len(), "next": null, "previous": null, "results": items}))
            .into_response()
    } else {
        Json(Value::Array(items)).into_response()
    }
}

async fn fetch(
    State(state): State<Arc<FakeState>>,
    Path((collection, id)): Path<(String, i64)>,
) -> Response {
    let records = state.records.lock().unwrap();
    match records
        .get(&collection)
        .and_then(|items| items.iter().find(|item| item["id"] == id))
    {
        Some(item) => Json(item.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, json!({"detail": "Not found."})),
    }
}

async fn read_fields(mut multipart: Multipart) -> Map<String, Value> {
    let mut fields = Map::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(String::from);
        let data = field.bytes().await.unwrap();
        let value = match file_name {
            Some(file_name) => format!("http://127.0.0.1:8000/media/uploads/{}", file_name),
            None => String::from_utf8_lossy(&data).to_string(),
        };
        fields.insert(name, Value::String(value));
    }
    fields
}

async fn create(
    State(state): State<Arc<FakeState>>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthenticated();
    }
    let mut fields = read_fields(multipart).await;
    if fields.get("titre").and_then(Value::as_str).unwrap_or_default().is_empty() {
        return error(
            StatusCode::BAD_REQUEST,
            json!({"titre": ["Ce champ est obligatoire."]}),
        );
    }

    let id = {
        let mut next = state.next_id.lock().unwrap();
        *next += 1;
        *next
    };
    fields.insert("id".to_string(), json!(id));
    if collection == "annonces" {
        fields.insert("auteur".to_string(), json!("Apporteur: awa"));
        fields.insert("date_publication".to_string(), json!(chrono::Utc::now().to_rfc3339()));
    }
    let record = Value::Object(fields);
    state
        .records
        .lock()
        .unwrap()
        .entry(collection)
        .or_default()
        .push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn update(
    State(state): State<Arc<FakeState>>,
    Path((collection, id)): Path<(String, i64)>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthenticated();
    }
    let fields = read_fields(multipart).await;
    let mut records = state.records.lock().unwrap();
    let Some(item) = records
        .get_mut(&collection)
        .and_then(|items| items.iter_mut().find(|item| item["id"] == id))
    else {
        return error(StatusCode::NOT_FOUND, json!({"detail": "Not found."}));
    };
    if let Value::Object(map) = item {
        map.extend(fields);
    }
    Json(item.clone()).into_response()
}

async fn remove(
    State(state): State<Arc<FakeState>>,
    Path((collection, id)): Path<(String, i64)>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthenticated();
    }
    let mut records = state.records.lock().unwrap();
    let Some(items) = records.get_mut(&collection) else {
        return error(StatusCode::NOT_FOUND, json!({"detail": "Not found."}));
    };
    let before = items.len();
    items.retain(|item| item["id"] != id);
    if items.len() == before {
        return error(StatusCode::NOT_FOUND, json!({"detail": "Not found."}));
    }
    StatusCode::NO_CONTENT.into_response()
}
