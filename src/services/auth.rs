//! Authentication service
//!
//! Member and admin sign-in against the backend token endpoint, account
//! creation, and sign-out. Successful sign-ins open a server-side session.

use std::sync::Arc;

use super::session::SessionStore;
use super::ServiceError;
use crate::backend::BackendClient;
use crate::models::{LoginForm, Session, SignupForm};

pub struct AuthService {
    client: Arc<BackendClient>,
    sessions: Arc<SessionStore>,
}

impl AuthService {
    pub fn new(client: Arc<BackendClient>, sessions: Arc<SessionStore>) -> Self {
        Self { client, sessions }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Sign in any account
    pub async fn login(&self, form: &LoginForm) -> Result<Session, ServiceError> {
        let tokens = self.obtain(form).await?;
        let session = self.sessions.create(tokens, &form.username).await;
        tracing::info!(username = %form.username, role = %session.role, "User signed in");
        Ok(session)
    }

    /// Sign in to the dashboard; non-admin accounts get no session
    pub async fn admin_login(&self, form: &LoginForm) -> Result<Session, ServiceError> {
        let tokens = self.obtain(form).await?;
        if !tokens.role.map(|role| role.is_admin()).unwrap_or(false) {
            tracing::warn!(username = %form.username, "Dashboard sign-in refused for non-admin account");
            return Err(ServiceError::AccessDenied);
        }
        let session = self.sessions.create(tokens, &form.username).await;
        tracing::info!(username = %form.username, "Admin signed in");
        Ok(session)
    }

    pub async fn signup(&self, form: &SignupForm) -> Result<(), ServiceError> {
        let errors = form.validate();
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }
        self.client.signup(&form.payload()).await?;
        tracing::info!(username = %form.username, role = %form.role, "Account created");
        Ok(())
    }

    pub async fn logout(&self, session_id: &str) {
        self.sessions.remove(session_id).await;
        tracing::debug!("Session closed");
    }

    async fn obtain(&self, form: &LoginForm) -> Result<crate::backend::TokenPair, ServiceError> {
        let errors = form.validate();
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }
        self.client
            .obtain_token(&form.username, &form.password)
            .await
            .map_err(|e| match e.status() {
                Some(400) | Some(401) => ServiceError::InvalidCredentials,
                _ => ServiceError::Backend(e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{unreachable_config, FakeBackend, ADMIN_TOKEN, MEMBER_TOKEN};
    use crate::models::Role;
    use std::time::Duration;

    fn service(config: &crate::config::BackendConfig) -> AuthService {
        AuthService::new(
            Arc::new(BackendClient::new(config).unwrap()),
            Arc::new(SessionStore::new(Duration::from_secs(60))),
        )
    }

    fn login(username: &str, password: &str) -> LoginForm {
        LoginForm {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_member_login_opens_session() {
        let backend = FakeBackend::spawn().await;
        let auth = service(&backend.config());

        let session = auth.login(&login("awa", "secret")).await.unwrap();
        assert_eq!(session.access_token, MEMBER_TOKEN);
        assert_eq!(session.role, Role::Chercheur);
        assert_eq!(session.display_name(), "Awa Ndiaye");
        assert!(auth.sessions().get(&session.id).await.is_some());
    }

    #[tokio::test]
    async fn test_admin_login_refuses_non_admin() {
        let backend = FakeBackend::spawn().await;
        let auth = service(&backend.config());

        let err = auth.admin_login(&login("awa", "secret")).await.unwrap_err();
        assert!(matches!(err, ServiceError::AccessDenied));
        assert_eq!(err.title(), "Accès refusé");

        let session = auth.admin_login(&login("admin", "secret")).await.unwrap();
        assert_eq!(session.access_token, ADMIN_TOKEN);
        assert!(session.is_admin());
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials() {
        let backend = FakeBackend::spawn().await;
        let auth = service(&backend.config());

        let err = auth.login(&login("admin", "nope")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials));
        assert_eq!(err.user_message(), "Nom d'utilisateur ou mot de passe incorrect");
    }

    #[tokio::test]
    async fn test_empty_form_is_not_sent() {
        let backend = FakeBackend::spawn().await;
        let auth = service(&backend.config());

        let err = auth.login(&login("", "")).await.unwrap_err();
        assert_eq!(err.field_errors().len(), 2);
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_backend_down_is_not_reported_as_bad_password() {
        let auth = service(&unreachable_config());
        let err = auth.login(&login("awa", "secret")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Backend(_)));
    }

    #[tokio::test]
    async fn test_signup_and_logout() {
        let backend = FakeBackend::spawn().await;
        let auth = service(&backend.config());

        let form = SignupForm {
            role: "chercheur".to_string(),
            username: "binta".to_string(),
            email: "binta@example.com".to_string(),
            password: "secret".to_string(),
            password_confirm: "secret".to_string(),
            ..Default::default()
        };
        auth.signup(&form).await.unwrap();
        assert_eq!(backend.requests_to("signup/").len(), 1);

        let session = auth.login(&login("awa", "secret")).await.unwrap();
        auth.logout(&session.id).await;
        assert!(auth.sessions().get(&session.id).await.is_none());
    }
}
