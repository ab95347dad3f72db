//! Sign-in, sign-up and sign-out pages
//!
//! Members sign in at `/connexion`, administrators at `/admin-login`. Both
//! open a server-side session and hand the browser an HttpOnly cookie with
//! its id; the backend tokens stay on the server.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use std::collections::{BTreeMap, HashMap};

use super::flash::Toast;
use super::middleware::{AppState, Visitor};
use super::page::{redirect_with, Page};
use crate::models::{ChoiceOption, ExpertService, FieldError, FormFields, LoginForm, Role, Session, SignupForm};
use crate::services::ServiceError;

/// Submitted fields echoed back into a failed form; passwords never are
const SECRET_FIELDS: &[&str] = &["password", "password_confirm"];

fn echo_values(values: &HashMap<String, String>) -> BTreeMap<&str, &str> {
    values
        .iter()
        .filter(|(name, _)| !SECRET_FIELDS.contains(&name.as_str()))
        .map(|(name, value)| (name.as_str(), value.trim()))
        .collect()
}

/// First message per field, keyed by input name
pub(crate) fn error_map(errors: &[FieldError]) -> BTreeMap<&'static str, &str> {
    let mut map = BTreeMap::new();
    for error in errors {
        map.entry(error.field).or_insert(error.message.as_str());
    }
    map
}

fn failure_status(error: &ServiceError) -> StatusCode {
    match error {
        ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        ServiceError::AccessDenied => StatusCode::FORBIDDEN,
        ServiceError::Backend(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Redirect after a successful sign-in, replacing any previous session
async fn signed_in(state: &AppState, visitor: &Visitor, session: &Session, location: &str) -> Response {
    if let Some(previous) = visitor.session_id() {
        state.auth.logout(previous).await;
    }
    let toast = Toast::success("Connexion réussie", format!("Bienvenue, {}", session.display_name()));
    redirect_with(location, Some(toast), &[state.session_cookie(session)])
}

/// GET /connexion
pub async fn login_page(State(state): State<AppState>, Extension(visitor): Extension<Visitor>) -> Response {
    if visitor.session.is_some() {
        return Redirect::to("/").into_response();
    }
    Page::new("auth/connexion.html").render(&state, &visitor)
}

/// POST /connexion
pub async fn login(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
    Form(values): Form<HashMap<String, String>>,
) -> Response {
    let form = LoginForm::from_fields(FormFields::from(values.clone()));
    match state.auth.login(&form).await {
        Ok(session) => signed_in(&state, &visitor, &session, "/").await,
        Err(e) => {
            tracing::debug!(username = %form.username, "Sign-in failed: {}", e);
            Page::new("auth/connexion.html")
                .status(failure_status(&e))
                .toast(Toast::from_error(&e))
                .with("values", &echo_values(&values))
                .with("errors", &error_map(e.field_errors()))
                .render(&state, &visitor)
        }
    }
}

fn signup_page() -> Page {
    let roles: Vec<_> = Role::SIGNUP
        .iter()
        .map(|role| ChoiceOption {
            code: role.code(),
            label: role.label(),
        })
        .collect();
    Page::new("auth/inscription.html")
        .with("roles", &roles)
        .with("services", &ExpertService::options())
}

/// GET /inscription
pub async fn signup_form(State(state): State<AppState>, Extension(visitor): Extension<Visitor>) -> Response {
    signup_page().render(&state, &visitor)
}

/// POST /inscription
pub async fn signup(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
    Form(values): Form<HashMap<String, String>>,
) -> Response {
    let form = SignupForm::from_fields(FormFields::from(values.clone()));
    match state.auth.signup(&form).await {
        Ok(()) => {
            let toast = Toast::success(
                "Inscription réussie",
                "Votre compte a été créé. Vous pouvez maintenant vous connecter.",
            );
            redirect_with("/connexion", Some(toast), &[])
        }
        Err(e) => {
            tracing::debug!(username = %form.username, "Sign-up failed: {}", e);
            signup_page()
                .status(failure_status(&e))
                .toast(Toast::from_error(&e))
                .with("values", &echo_values(&values))
                .with("errors", &error_map(e.field_errors()))
                .render(&state, &visitor)
        }
    }
}

/// POST /deconnexion
pub async fn logout(State(state): State<AppState>, Extension(visitor): Extension<Visitor>) -> Response {
    if let Some(id) = visitor.session_id() {
        state.auth.logout(id).await;
    }
    let toast = Toast::success("Déconnexion", "Vous êtes déconnecté.");
    redirect_with("/", Some(toast), &[state.clear_session_cookie()])
}

/// GET /admin-login
pub async fn admin_login_page(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
) -> Response {
    if visitor.is_admin() {
        return Redirect::to("/dashboard").into_response();
    }
    Page::new("admin/login.html").render(&state, &visitor)
}

/// POST /admin-login - non-admin accounts are refused without a session
pub async fn admin_login(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
    Form(values): Form<HashMap<String, String>>,
) -> Response {
    let form = LoginForm::from_fields(FormFields::from(values.clone()));
    match state.auth.admin_login(&form).await {
        Ok(session) => signed_in(&state, &visitor, &session, "/dashboard").await,
        Err(e) => Page::new("admin/login.html")
            .status(failure_status(&e))
            .toast(Toast::from_error(&e))
            .with("values", &echo_values(&values))
            .with("errors", &error_map(e.field_errors()))
            .render(&state, &visitor),
    }
}

/// POST /dashboard/logout
pub async fn admin_logout(State(state): State<AppState>, Extension(visitor): Extension<Visitor>) -> Response {
    if let Some(id) = visitor.session_id() {
        state.auth.logout(id).await;
    }
    let toast = Toast::success("Déconnexion", "Vous avez quitté l'administration.");
    redirect_with("/admin-login", Some(toast), &[state.clear_session_cookie()])
}
