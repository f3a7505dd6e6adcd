//! Single-flight access token refresh
//!
//! Concurrent requests that fail authentication all funnel into one
//! [`TokenRefresher`]. Refreshes are serialized by a mutex; a waiter that
//! finds a different token already stored reuses it instead of spending the
//! refresh token again. New tokens are only stored if the refresh token that
//! was spent is still current, so a logout during the call stays a logout.

use crate::models::{RefreshRequest, RefreshResponse};
use crate::{ApiError, Result};
use reqwest::Client as ReqwestClient;
use std::collections::HashMap;
use std::sync::Arc;
use storage::TokenStore;
use tokio::sync::Mutex;

/// Refreshes the access token using the stored refresh token
pub struct TokenRefresher {
    client: ReqwestClient,
    url: String,
    tokens: Arc<TokenStore>,
    headers: HashMap<String, String>,
    lock: Mutex<()>,
}

impl std::fmt::Debug for TokenRefresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRefresher").field("url", &self.url).finish()
    }
}

impl TokenRefresher {
    /// Create a refresher posting to `url`
    pub fn new(client: ReqwestClient, url: impl Into<String>, tokens: Arc<TokenStore>) -> Self {
        Self { client, url: url.into(), tokens, headers: HashMap::new(), lock: Mutex::new(()) }
    }

    /// Headers sent with every refresh request
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Obtain a fresh access token
    ///
    /// `stale` is the token the caller was rejected with. If another task
    /// has already replaced it, the stored token is returned without a
    /// network call.
    pub async fn refresh(&self, stale: Option<&str>) -> Result<String> {
        let _guard = self.lock.lock().await;

        if let Some(current) = self.tokens.get_token().await {
            if stale != Some(current.as_str()) {
                tracing::debug!("access token already refreshed by another request");
                return Ok(current);
            }
        }

        let Some(refresh_token) = self.tokens.get_refresh_token().await else {
            tracing::warn!("no refresh token stored, cannot refresh session");
            return Err(ApiError::NoRefreshToken);
        };

        tracing::info!("refreshing access token");
        let mut req = self.client.post(&self.url);
        for (key, value) in &self.headers {
            req = req.header(key, value);
        }
        let response = req
            .json(&RefreshRequest { refresh_token: refresh_token.clone() })
            .send()
            .await
            .map_err(|e| ApiError::RefreshFailed(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::RefreshFailed(format!("refresh endpoint returned {status}")));
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|e| ApiError::RefreshFailed(format!("malformed refresh response: {e}")))?;

        let stored = self
            .tokens
            .rotate_tokens(&refresh_token, &body.access_token, body.refresh_token.as_deref())
            .await;
        if !stored {
            return Err(ApiError::SessionEnded);
        }
        tracing::info!("access token refreshed");

        Ok(body.access_token)
    }
}
