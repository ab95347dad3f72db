//! Server-side session store
//!
//! Backend tokens never reach the browser: the visitor only holds an opaque
//! session id in an HttpOnly cookie, and the tokens stay here until the
//! session expires or the visitor signs out.

use chrono::Utc;
use moka::future::Cache;
use std::time::Duration;
use uuid::Uuid;

use crate::backend::TokenPair;
use crate::config::SessionConfig;
use crate::models::{Role, Session};

const MAX_SESSIONS: u64 = 100_000;

pub struct SessionStore {
    sessions: Cache<String, Session>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .time_to_live(ttl)
            .build();
        Self { sessions, ttl }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(Duration::from_secs(config.ttl_seconds))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Open a session for freshly issued tokens
    pub async fn create(&self, tokens: TokenPair, username: &str) -> Session {
        let session = Session {
            id: Uuid::new_v4().to_string(),
            access_token: tokens.access,
            refresh_token: tokens.refresh,
            role: tokens.role.unwrap_or(Role::Member),
            username: username.to_string(),
            first_name: tokens.first_name,
            last_name: tokens.last_name,
            created_at: Utc::now(),
        };
        self.sessions
            .insert(session.id.clone(), session.clone())
            .await;
        session
    }

    pub async fn get(&self, id: &str) -> Option<Session> {
        if id.is_empty() {
            return None;
        }
        self.sessions.get(id).await
    }

    pub async fn remove(&self, id: &str) {
        self.sessions.invalidate(id).await;
    }
}
