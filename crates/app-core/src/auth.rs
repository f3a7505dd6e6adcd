//! Login and logout
//!
//! The login flow drives the session store through `Authenticating` and
//! lands on either `Authenticated` or back on `Unauthenticated`.

use crate::error::{Error, Result};
use app_state::{SessionPayload, SessionSnapshot, SessionStore};
use okul_client::{ApiError, LoginOutcome, SchoolApi};
use std::sync::Arc;

/// Authentication service
#[derive(Debug, Clone)]
pub struct AuthService {
    api: SchoolApi,
    session: Arc<SessionStore>,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(api: SchoolApi, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    /// Log in and start a session
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionSnapshot> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(Error::MissingFields);
        }

        self.session.begin_login().await;
        match self.try_login(username, password).await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                tracing::info!("login failed: {}", e);
                self.session.fail_login().await;
                Err(e)
            }
        }
    }

    async fn try_login(&self, username: &str, password: &str) -> Result<SessionSnapshot> {
        let outcome = match self.api.login(username, password).await {
            Ok(outcome) => outcome,
            Err(ApiError::Http { status: 400, .. }) => return Err(Error::InvalidCredentials),
            Err(e) => return Err(e.into()),
        };

        match outcome {
            LoginOutcome::InvalidCredentials => Err(Error::InvalidCredentials),
            LoginOutcome::Success { token, refresh_token, role } => {
                let payload = SessionPayload {
                    access_token: token,
                    refresh_token,
                    role,
                    school_code: None,
                };
                Ok(self.session.set_session(payload).await?)
            }
        }
    }

    /// End the session
    pub async fn logout(&self) -> SessionSnapshot {
        self.session.clear_session().await
    }
}
