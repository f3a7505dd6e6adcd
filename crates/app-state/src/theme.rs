//! Theme selection
//!
//! Dark is the default. The choice is persisted as `"dark"` or `"light"`.

use crate::observer::{Observers, SubscriptionId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use storage::TokenStore;

/// Light or dark appearance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Dark appearance
    #[default]
    Dark,
    /// Light appearance
    Light,
}

impl ThemeMode {
    /// Persisted name
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Dark => "dark",
            ThemeMode::Light => "light",
        }
    }

    /// The other mode
    pub fn toggled(&self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }

    /// Whether this is the dark mode
    pub fn is_dark(&self) -> bool {
        matches!(self, ThemeMode::Dark)
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dark" => Ok(ThemeMode::Dark),
            "light" => Ok(ThemeMode::Light),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

/// Process-wide theme with persistence and change notification
pub struct ThemeStore {
    tokens: Arc<TokenStore>,
    mode: RwLock<ThemeMode>,
    observers: Observers<ThemeMode>,
}

impl std::fmt::Debug for ThemeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeStore").field("mode", &self.mode()).finish()
    }
}

impl ThemeStore {
    /// Create a store in the default mode
    pub fn new(tokens: Arc<TokenStore>) -> Self {
        Self { tokens, mode: RwLock::new(ThemeMode::default()), observers: Observers::new() }
    }

    /// Current mode
    pub fn mode(&self) -> ThemeMode {
        *self.mode.read()
    }

    /// Read the persisted mode; unknown values keep the default
    pub async fn load(&self) -> ThemeMode {
        let mode = match self.tokens.get_theme().await {
            Some(stored) => stored.parse().unwrap_or_else(|e| {
                tracing::warn!("ignoring persisted theme: {}", e);
                ThemeMode::default()
            }),
            None => ThemeMode::default(),
        };
        self.apply(mode);
        mode
    }

    /// Flip the mode and persist it
    pub async fn toggle(&self) -> ThemeMode {
        let next = self.mode().toggled();
        self.set_mode(next).await;
        next
    }

    /// Set and persist a mode
    pub async fn set_mode(&self, mode: ThemeMode) {
        self.apply(mode);
        self.tokens.set_theme(Some(mode.as_str())).await;
        tracing::debug!(theme = mode.as_str(), "theme changed");
    }

    /// Register a callback for mode changes
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&ThemeMode) + Send + Sync + 'static,
    {
        self.observers.subscribe(observer)
    }

    /// Remove a callback
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn apply(&self, mode: ThemeMode) {
        *self.mode.write() = mode;
        self.observers.notify(&mode);
    }
}
