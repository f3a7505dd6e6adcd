//! Persisted credentials and device preferences
//!
//! The token store is the only place credentials live between launches. It
//! never surfaces storage failures: reads degrade to `None` and writes become
//! logged no-ops, so an unavailable platform store behaves like an empty one.

use crate::kv::{KvConfig, KvStore};
use parking_lot::Mutex;
use std::sync::Arc;

const SESSION_SCOPE: &str = "session";
const DEVICE_SCOPE: &str = "device";

const ACCESS_TOKEN: &str = "access_token";
const REFRESH_TOKEN: &str = "refresh_token";
const ROLE: &str = "role";
const SCHOOL_CODE: &str = "school_code";
const THEME: &str = "theme";

/// Key-value persistence for access/refresh tokens, session metadata and theme
///
/// Clones share the backing store and the lock that orders token rotation
/// against [`TokenStore::clear_session`].
#[derive(Debug, Clone)]
pub struct TokenStore {
    kv: Option<Arc<KvStore>>,
    session_lock: Arc<Mutex<()>>,
}

impl TokenStore {
    /// Open the store on disk; failure leaves the store unavailable
    pub fn open(config: KvConfig) -> Self {
        match KvStore::new(config) {
            Ok(kv) => Self::with_kv(Arc::new(kv)),
            Err(e) => {
                tracing::warn!("token store unavailable, credentials will not persist: {}", e);
                Self::unavailable()
            }
        }
    }

    /// Wrap an existing key-value store
    pub fn with_kv(kv: Arc<KvStore>) -> Self {
        Self { kv: Some(kv), session_lock: Arc::new(Mutex::new(())) }
    }

    /// A temporary store, mostly for tests
    pub fn in_memory() -> Self {
        match KvStore::in_memory() {
            Ok(kv) => Self::with_kv(Arc::new(kv)),
            Err(e) => {
                tracing::warn!("temporary token store unavailable: {}", e);
                Self::unavailable()
            }
        }
    }

    /// A store whose reads always return `None`
    pub fn unavailable() -> Self {
        Self { kv: None, session_lock: Arc::new(Mutex::new(())) }
    }

    /// Whether a backing store is present
    pub fn is_available(&self) -> bool {
        self.kv.is_some()
    }

    /// Stored access token
    pub async fn get_token(&self) -> Option<String> {
        self.read(SESSION_SCOPE, ACCESS_TOKEN)
    }

    /// Store or remove the access token
    pub async fn set_token(&self, value: Option<&str>) {
        self.write(SESSION_SCOPE, ACCESS_TOKEN, value);
    }

    /// Stored refresh token
    pub async fn get_refresh_token(&self) -> Option<String> {
        self.read(SESSION_SCOPE, REFRESH_TOKEN)
    }

    /// Store or remove the refresh token
    pub async fn set_refresh_token(&self, value: Option<&str>) {
        self.write(SESSION_SCOPE, REFRESH_TOKEN, value);
    }

    /// Stored role name (`admin`, `teacher`, `parent`)
    pub async fn get_role(&self) -> Option<String> {
        self.read(SESSION_SCOPE, ROLE)
    }

    /// Store or remove the role name
    pub async fn set_role(&self, value: Option<&str>) {
        self.write(SESSION_SCOPE, ROLE, value);
    }

    /// School code selected before login
    pub async fn get_school_code(&self) -> Option<String> {
        self.read(DEVICE_SCOPE, SCHOOL_CODE)
    }

    /// Store or remove the school code
    pub async fn set_school_code(&self, value: Option<&str>) {
        self.write(DEVICE_SCOPE, SCHOOL_CODE, value);
    }

    /// Stored theme preference (`dark` or `light`)
    pub async fn get_theme(&self) -> Option<String> {
        self.read(DEVICE_SCOPE, THEME)
    }

    /// Store or remove the theme preference
    pub async fn set_theme(&self, value: Option<&str>) {
        self.write(DEVICE_SCOPE, THEME, value);
    }

    /// Store a freshly issued token pair
    pub async fn set_session_tokens(&self, access_token: &str, refresh_token: Option<&str>) {
        let _guard = self.session_lock.lock();
        self.write(SESSION_SCOPE, ACCESS_TOKEN, Some(access_token));
        self.write(SESSION_SCOPE, REFRESH_TOKEN, refresh_token);
    }

    /// Swap in refreshed tokens if `spent` is still the stored refresh token
    ///
    /// Returns `false` and leaves the store untouched when the session was
    /// cleared or replaced while the refresh was in flight. `refresh_token`
    /// of `None` keeps the spent one.
    pub async fn rotate_tokens(
        &self,
        spent: &str,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> bool {
        let _guard = self.session_lock.lock();
        if self.read(SESSION_SCOPE, REFRESH_TOKEN).as_deref() != Some(spent) {
            tracing::info!("session changed during token refresh, discarding refreshed tokens");
            return false;
        }
        self.write(SESSION_SCOPE, ACCESS_TOKEN, Some(access_token));
        if let Some(refresh_token) = refresh_token {
            self.write(SESSION_SCOPE, REFRESH_TOKEN, Some(refresh_token));
        }
        true
    }

    /// Remove tokens and role; the school code and theme stay
    pub async fn clear_session(&self) {
        let _guard = self.session_lock.lock();
        let Some(kv) = &self.kv else { return };
        match kv.clear_scope(SESSION_SCOPE) {
            Ok(removed) => tracing::debug!(removed, "cleared persisted session"),
            Err(e) => tracing::warn!("failed to clear persisted session: {}", e),
        }
        self.flush();
    }

    fn read(&self, scope: &str, key: &str) -> Option<String> {
        let kv = self.kv.as_ref()?;
        match kv.get_scoped::<String>(&[scope, key]) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(scope, key, "token store read failed: {}", e);
                None
            }
        }
    }

    fn write(&self, scope: &str, key: &str, value: Option<&str>) {
        let Some(kv) = &self.kv else {
            tracing::debug!(scope, key, "token store unavailable, write skipped");
            return;
        };
        let result = match value {
            Some(value) => kv.set_scoped(&[scope, key], value),
            None => kv.remove_scoped(&[scope, key]).map(|_| ()),
        };
        if let Err(e) = result {
            tracing::warn!(scope, key, "token store write failed: {}", e);
            return;
        }
        self.flush();
    }

    fn flush(&self) {
        if let Some(kv) = &self.kv {
            if let Err(e) = kv.flush() {
                tracing::warn!("token store flush failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_token_round_trip() {
        let store = TokenStore::in_memory();
        assert!(store.get_token().await.is_none());

        store.set_token(Some("access-1")).await;
        store.set_refresh_token(Some("refresh-1")).await;

        assert_eq!(store.get_token().await.as_deref(), Some("access-1"));
        assert_eq!(store.get_refresh_token().await.as_deref(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn test_setting_none_removes_value() {
        let store = TokenStore::in_memory();
        store.set_token(Some("access-1")).await;
        store.set_token(None).await;
        assert!(store.get_token().await.is_none());
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_silently() {
        let store = TokenStore::unavailable();
        assert!(!store.is_available());

        store.set_token(Some("ignored")).await;
        store.set_theme(Some("light")).await;
        store.clear_session().await;

        assert!(store.get_token().await.is_none());
        assert!(store.get_theme().await.is_none());
    }

    #[tokio::test]
    async fn test_clear_session_keeps_device_settings() {
        let store = TokenStore::in_memory();
        store.set_token(Some("a")).await;
        store.set_refresh_token(Some("r")).await;
        store.set_role(Some("teacher")).await;
        store.set_school_code(Some("OKUL42")).await;
        store.set_theme(Some("light")).await;

        store.clear_session().await;

        assert!(store.get_token().await.is_none());
        assert!(store.get_refresh_token().await.is_none());
        assert!(store.get_role().await.is_none());
        assert_eq!(store.get_school_code().await.as_deref(), Some("OKUL42"));
        assert_eq!(store.get_theme().await.as_deref(), Some("light"));
    }

    #[tokio::test]
    async fn test_rotate_tokens_replaces_pair() {
        let store = TokenStore::in_memory();
        store.set_session_tokens("a1", Some("r1")).await;

        assert!(store.rotate_tokens("r1", "a2", Some("r2")).await);
        assert_eq!(store.get_token().await.as_deref(), Some("a2"));
        assert_eq!(store.get_refresh_token().await.as_deref(), Some("r2"));

        assert!(store.rotate_tokens("r2", "a3", None).await);
        assert_eq!(store.get_token().await.as_deref(), Some("a3"));
        assert_eq!(store.get_refresh_token().await.as_deref(), Some("r2"));
    }

    #[tokio::test]
    async fn test_rotate_tokens_after_clear_is_discarded() {
        let store = TokenStore::in_memory();
        store.set_session_tokens("a1", Some("r1")).await;
        store.clear_session().await;

        assert!(!store.rotate_tokens("r1", "a2", Some("r2")).await);
        assert!(store.get_token().await.is_none());
        assert!(store.get_refresh_token().await.is_none());
    }

    #[tokio::test]
    async fn test_rotate_tokens_after_new_login_is_discarded() {
        let store = TokenStore::in_memory();
        store.set_session_tokens("a1", Some("r1")).await;
        store.set_session_tokens("login", Some("login-r")).await;

        assert!(!store.rotate_tokens("r1", "a2", Some("r2")).await);
        assert_eq!(store.get_token().await.as_deref(), Some("login"));
    }

    #[tokio::test]
    async fn test_values_persist_across_reopen() {
        let dir = TempDir::new().unwrap();
        let config = KvConfig::new(dir.path().join("tokens"));

        {
            let store = TokenStore::open(config.clone());
            store.set_theme(Some("light")).await;
            store.set_token(Some("persisted")).await;
        }

        let store = TokenStore::open(config);
        assert_eq!(store.get_theme().await.as_deref(), Some("light"));
        assert_eq!(store.get_token().await.as_deref(), Some("persisted"));
    }

    #[tokio::test]
    async fn test_no_shape_validation() {
        let store = TokenStore::in_memory();
        store.set_theme(Some("neon")).await;
        assert_eq!(store.get_theme().await.as_deref(), Some("neon"));
    }
}
