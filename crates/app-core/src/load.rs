//! Screen load state
//!
//! Fetch failures become [`LoadState::Failed`] with a message for the user.
//! No placeholder records are substituted.

use crate::error::Error;

/// Outcome of loading data for a screen
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState<T> {
    /// Nothing requested yet
    #[default]
    Idle,
    /// Data available
    Loaded(T),
    /// Request succeeded with nothing to show
    Empty,
    /// Request failed; carries the user-facing message
    Failed(String),
}

impl<T> LoadState<T> {
    /// Loaded data, if any
    pub fn data(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    /// Take the loaded data
    pub fn into_data(self) -> Option<T> {
        match self {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    /// Failure message, if any
    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Whether data is available
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded(_))
    }

    /// Transform the loaded data
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadState<U> {
        match self {
            LoadState::Idle => LoadState::Idle,
            LoadState::Loaded(data) => LoadState::Loaded(f(data)),
            LoadState::Empty => LoadState::Empty,
            LoadState::Failed(message) => LoadState::Failed(message),
        }
    }

    /// Failed state for an error, logging it
    pub fn failed(context: &str, error: &Error) -> Self {
        tracing::warn!("{} failed: {}", context, error);
        LoadState::Failed(error.user_message())
    }
}

impl<T> LoadState<Vec<T>> {
    /// `Empty` for an empty list, `Loaded` otherwise
    pub fn from_list(items: Vec<T>) -> Self {
        if items.is_empty() {
            LoadState::Empty
        } else {
            LoadState::Loaded(items)
        }
    }
}
