//! Web layer - routes, handlers and middleware
//!
//! Server-rendered pages:
//! - Public pages (home, annonces, profils, documentation, actualités)
//! - Member and admin sign-in
//! - Admin dashboard (behind `require_admin`)
//! - Embedded static assets

pub mod auth;
pub mod dashboard;
pub mod flash;
pub mod forms;
pub mod middleware;
pub mod page;
pub mod public;
pub mod static_files;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

pub use flash::{Toast, ToastKind};
pub use middleware::{AppState, Visitor, WebError};

/// Room for the text fields sent along with a file
const FORM_OVERHEAD: usize = 1024 * 1024;

/// Dashboard routes (admin session required)
fn dashboard_router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::dashboard))
        .route("/dashboard/logout", post(auth::admin_logout))
        .route("/dashboard/{kind}", post(dashboard::create))
        .route("/dashboard/{kind}/{id}", post(dashboard::update))
        .route("/dashboard/{kind}/{id}/delete", post(dashboard::delete))
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
}

/// Build the complete router with middleware
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.upload.max_file_size as usize + FORM_OVERHEAD;

    Router::new()
        .route("/", get(public::home))
        .route("/accueil", get(public::home))
        .route("/annonces", get(public::annonces).post(public::publish_annonce))
        .route("/annonces/{id}", get(public::annonce_detail))
        .route("/profils", get(public::profils))
        .route("/documentation", get(public::documentation))
        .route("/actualites", get(public::actualites))
        .route("/connexion", get(auth::login_page).post(auth::login))
        .route("/inscription", get(auth::signup_form).post(auth::signup))
        .route("/deconnexion", post(auth::logout))
        .route("/admin-login", get(auth::admin_login_page).post(auth::admin_login))
        .route("/assets/{*path}", get(static_files::serve_asset))
        .merge(dashboard_router())
        .fallback(public::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::render_error_pages,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::load_session,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
