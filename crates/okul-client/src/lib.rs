//! Okul Koçu API client
//!
//! This crate talks to the school-management backend: the HTTP client with
//! bearer-token interception and refresh, typed endpoint DTOs, the endpoint
//! wrappers used by screens, and photo URL resolution.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod http;
pub mod models;
pub mod photo;
pub mod refresh;
pub mod token;

pub use api::{LoginOutcome, SchoolApi};
pub use http::{
    ApiClient, ApiClientConfig, ApiRequest, ApiResponse, AuthFailureHandler, FormField,
    NoopAuthFailureHandler,
};
pub use models::{AttendanceStatus, Role};
pub use photo::PhotoResolver;

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error types for API operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("HTTP error ({status}): {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Server message, or the raw body when no message field exists
        message: String,
    },

    /// Authentication failed and could not be recovered
    #[error("Unauthorized: session is no longer valid")]
    Unauthorized,

    /// No refresh token is stored
    #[error("No refresh token available")]
    NoRefreshToken,

    /// The refresh endpoint rejected the refresh token
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// The session was cleared or replaced while a refresh was in flight
    #[error("Session ended during token refresh")]
    SessionEnded,

    /// Response body did not match the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Invalid input supplied by the caller
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    /// HTTP status for errors that carry one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Unauthorized | ApiError::SessionEnded => Some(401),
            _ => None,
        }
    }

    /// Whether the request failed before reaching the server or on a gateway error
    pub fn is_network_error(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Http { status, .. } => matches!(status, 408 | 429 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// Whether the error ended the session
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthorized
                | ApiError::NoRefreshToken
                | ApiError::RefreshFailed(_)
                | ApiError::SessionEnded
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(e.to_string())
    }
}
