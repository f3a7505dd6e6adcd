//! Session state
//!
//! The [`SessionStore`] owns the in-memory session and its persisted copy in
//! the [`TokenStore`]. Screens read snapshots; only login, logout and the
//! API client's refresh and auth-failure callbacks change it.

use crate::observer::{Observers, SubscriptionId};
use async_trait::async_trait;
use okul_client::{token, AuthFailureHandler, Role};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use storage::TokenStore;
use tokio::sync::{watch, RwLock};

/// Session-related errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionStateError {
    /// A session was set without an access token
    #[error("Access token is empty")]
    EmptyToken,

    /// A blank school code was selected
    #[error("School code is empty")]
    EmptySchoolCode,
}

/// Result type for session state operations
pub type Result<T> = std::result::Result<T, SessionStateError>;

/// Lifecycle phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No session
    #[default]
    Unauthenticated,
    /// Login request in flight
    Authenticating,
    /// Logged in
    Authenticated,
}

/// Point-in-time view of the session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Lifecycle phase
    pub phase: SessionPhase,
    /// Role of the logged-in user
    pub role: Option<Role>,
    /// School chosen before login
    pub school_code: Option<String>,
    /// Current access token
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
}

impl SessionSnapshot {
    /// Authenticated with a token present
    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated && self.access_token.is_some()
    }
}

/// Data produced by a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPayload {
    /// Access token
    pub access_token: String,
    /// Refresh token, if issued
    pub refresh_token: Option<String>,
    /// Role
    pub role: Role,
    /// School code; `None` keeps the one already selected
    pub school_code: Option<String>,
}

/// Process-wide session state with persistence and change notification
pub struct SessionStore {
    tokens: Arc<TokenStore>,
    state: RwLock<SessionSnapshot>,
    changes: watch::Sender<SessionSnapshot>,
    observers: Observers<SessionSnapshot>,
    restored: AtomicBool,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("restored", &self.restored.load(Ordering::SeqCst))
            .field("observers", &self.observers)
            .finish()
    }
}

impl SessionStore {
    /// Create an empty store backed by `tokens`
    pub fn new(tokens: Arc<TokenStore>) -> Self {
        let (changes, _) = watch::channel(SessionSnapshot::default());
        Self {
            tokens,
            state: RwLock::new(SessionSnapshot::default()),
            changes,
            observers: Observers::new(),
            restored: AtomicBool::new(false),
        }
    }

    /// Token store shared with the API client
    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Whether startup restore is still pending
    pub fn is_loading(&self) -> bool {
        !self.restored.load(Ordering::SeqCst)
    }

    /// Current snapshot
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.clone()
    }

    /// Whether the user is logged in
    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    /// Load the persisted session at startup
    pub async fn restore(&self) -> SessionSnapshot {
        let access_token = self.tokens.get_token().await;
        let school_code = self.tokens.get_school_code().await;
        let role = match self.tokens.get_role().await {
            Some(stored) => match stored.parse::<Role>() {
                Ok(role) => Some(role),
                Err(e) => {
                    tracing::warn!("ignoring persisted role: {}", e);
                    None
                }
            },
            None => None,
        };

        if let Some(token) = access_token.as_deref() {
            if token::is_expired(token) == Some(true) {
                tracing::info!("restored access token has expired, it will be refreshed on first use");
            }
        }

        let phase = match (&access_token, role) {
            (Some(_), Some(_)) => SessionPhase::Authenticated,
            (Some(_), None) => {
                tracing::warn!("persisted token has no role, staying logged out");
                SessionPhase::Unauthenticated
            }
            _ => SessionPhase::Unauthenticated,
        };

        let snapshot = SessionSnapshot { phase, role, school_code, access_token };
        tracing::info!(phase = ?snapshot.phase, "session restored");
        self.restored.store(true, Ordering::SeqCst);
        self.modify(|state| *state = snapshot).await
    }

    /// Persist the school chosen before login
    pub async fn select_school(&self, code: &str) -> Result<SessionSnapshot> {
        let code = code.trim();
        if code.is_empty() {
            return Err(SessionStateError::EmptySchoolCode);
        }
        self.tokens.set_school_code(Some(code)).await;

        Ok(self.modify(|state| state.school_code = Some(code.to_string())).await)
    }

    /// Mark a login request as in flight
    pub async fn begin_login(&self) -> SessionSnapshot {
        self.modify(|state| state.phase = SessionPhase::Authenticating).await
    }

    /// Return to logged-out after a failed login
    pub async fn fail_login(&self) -> SessionSnapshot {
        self.modify(|state| {
            state.phase = SessionPhase::Unauthenticated;
            state.access_token = None;
            state.role = None;
        })
        .await
    }

    /// Persist a new session and mark it authenticated
    pub async fn set_session(&self, payload: SessionPayload) -> Result<SessionSnapshot> {
        if payload.access_token.trim().is_empty() {
            return Err(SessionStateError::EmptyToken);
        }

        self.tokens
            .set_session_tokens(&payload.access_token, payload.refresh_token.as_deref())
            .await;
        self.tokens.set_role(Some(payload.role.as_str())).await;
        if let Some(code) = payload.school_code.as_deref() {
            self.tokens.set_school_code(Some(code)).await;
        }

        tracing::info!(role = %payload.role, "session started");
        let snapshot = self
            .modify(|state| {
                state.phase = SessionPhase::Authenticated;
                state.role = Some(payload.role);
                state.access_token = Some(payload.access_token);
                if payload.school_code.is_some() {
                    state.school_code = payload.school_code;
                }
            })
            .await;
        Ok(snapshot)
    }

    /// Wipe persisted credentials and log out
    pub async fn clear_session(&self) -> SessionSnapshot {
        self.tokens.clear_session().await;

        tracing::info!("session cleared");
        self.modify(|state| {
            state.phase = SessionPhase::Unauthenticated;
            state.role = None;
            state.access_token = None;
        })
        .await
    }

    /// Adopt an access token produced by a refresh
    ///
    /// Ignored unless the session is authenticated and the token is still
    /// the persisted one, so a refresh that lost a race with logout cannot
    /// revive the session.
    pub async fn token_refreshed(&self, access_token: &str) -> SessionSnapshot {
        let mut state = self.state.write().await;
        let persisted = self.tokens.get_token().await;
        if state.phase != SessionPhase::Authenticated
            || persisted.as_deref() != Some(access_token)
            || state.access_token.as_deref() == Some(access_token)
        {
            return state.clone();
        }
        state.access_token = Some(access_token.to_string());
        tracing::debug!("session adopted refreshed access token");
        self.publish(&state);
        state.clone()
    }

    /// Register a callback for every transition
    ///
    /// Callbacks run in transition order while the session is locked.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&SessionSnapshot) + Send + Sync + 'static,
    {
        self.observers.subscribe(observer)
    }

    /// Remove a callback
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Receiver that always holds the latest snapshot
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.changes.subscribe()
    }

    async fn modify(&self, f: impl FnOnce(&mut SessionSnapshot)) -> SessionSnapshot {
        let mut state = self.state.write().await;
        f(&mut *state);
        self.publish(&state);
        state.clone()
    }

    // Callers hold the write guard so the channel and observers see
    // transitions in the order they were applied.
    fn publish(&self, snapshot: &SessionSnapshot) {
        self.changes.send_replace(snapshot.clone());
        self.observers.notify(snapshot);
    }
}

#[async_trait]
impl AuthFailureHandler for SessionStore {
    async fn on_auth_failure(&self) {
        tracing::warn!("API reported an unrecoverable auth failure");
        self.clear_session().await;
    }

    async fn on_token_refreshed(&self, access_token: &str) {
        self.token_refreshed(access_token).await;
    }
}
