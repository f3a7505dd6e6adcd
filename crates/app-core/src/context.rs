//! Application wiring
//!
//! Builds the token store, session and theme stores and the API client, with
//! the session store injected as the client's auth-failure handler.

use crate::error::Result;
use app_state::{SessionSnapshot, SessionStore, ThemeMode, ThemeStore};
use okul_client::{ApiClient, ApiClientConfig, AuthFailureHandler, SchoolApi};
use std::sync::Arc;
use storage::{KvConfig, TokenStore};

/// Shared services for every screen
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Endpoint wrappers
    pub api: SchoolApi,
    /// Session state
    pub session: Arc<SessionStore>,
    /// Theme state
    pub theme: Arc<ThemeStore>,
}

impl AppContext {
    /// Open persistent storage at `kv` and connect to the configured backend
    pub fn new(api_config: ApiClientConfig, kv: KvConfig) -> Result<Self> {
        Self::with_tokens(api_config, Arc::new(TokenStore::open(kv)))
    }

    /// Build the context over an existing token store
    pub fn with_tokens(api_config: ApiClientConfig, tokens: Arc<TokenStore>) -> Result<Self> {
        let session = Arc::new(SessionStore::new(Arc::clone(&tokens)));
        let theme = Arc::new(ThemeStore::new(Arc::clone(&tokens)));

        let handler: Arc<dyn AuthFailureHandler> = session.clone();
        let client = ApiClient::new(api_config, tokens, handler)?;

        Ok(Self { api: SchoolApi::new(Arc::new(client)), session, theme })
    }

    /// Restore the persisted session and theme
    pub async fn start(&self) -> (SessionSnapshot, ThemeMode) {
        let theme = self.theme.load().await;
        let session = self.session.restore().await;
        tracing::info!(authenticated = session.is_authenticated(), theme = theme.as_str(), "app started");
        (session, theme)
    }
}
