//! HTTP client with bearer-token interception
//!
//! Every request goes through [`ApiClient::execute`], which attaches the stored
//! access token, detects authentication failures, refreshes the token at most
//! once per request and reports refreshed tokens and irrecoverable failures
//! to the injected [`AuthFailureHandler`].

use crate::refresh::TokenRefresher;
use crate::{ApiError, Result};
use async_trait::async_trait;
use reqwest::{multipart, Client as ReqwestClient};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use storage::TokenStore;

/// Message body the backend returns for an invalid or expired token
pub const TOKEN_INVALID_MESSAGE: &str = "Token geçersiz veya süresi dolmuş";

/// Default API origin
pub const DEFAULT_BASE_URL: &str = "https://c802f00043e4.ngrok-free.app/api";

/// Default static host for uploaded photos
pub const DEFAULT_UPLOAD_URL: &str = "https://c802f00043e4.ngrok-free.app/uploads";

/// Placeholder avatar service used for demo photo names
pub const DEFAULT_PLACEHOLDER_URL: &str = "https://randomuser.me/api/portraits";

// =============================================================================
// Auth failure seam
// =============================================================================

/// Capability the client reports session changes to
///
/// The session layer implements this to track refreshed tokens and to clear
/// the session; the client only holds the capability, which keeps the
/// dependency one-way.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthFailureHandler: Send + Sync {
    /// Called after refresh failed or the retried request was rejected again
    async fn on_auth_failure(&self);

    /// Called with the access token a refresh produced, before the retry
    async fn on_token_refreshed(&self, _access_token: &str) {}
}

/// Handler that only logs, for clients without a session
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuthFailureHandler;

#[async_trait]
impl AuthFailureHandler for NoopAuthFailureHandler {
    async fn on_auth_failure(&self) {
        tracing::debug!("auth failure with no session handler registered");
    }
}

// =============================================================================
// Request Types
// =============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request
    Get,
    /// POST request
    Post,
}

impl HttpMethod {
    /// Method name
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// A single multipart form field
#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    /// Plain text field
    Text {
        /// Field name
        name: String,
        /// Field value
        value: String,
    },
    /// File field
    File {
        /// Field name
        name: String,
        /// File name sent to the server
        file_name: String,
        /// MIME type
        mime: String,
        /// File contents
        bytes: Vec<u8>,
    },
}

impl FormField {
    /// Create a text field
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        FormField::Text { name: name.into(), value: value.into() }
    }

    /// Create a file field
    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        FormField::File {
            name: name.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Field name
    pub fn name(&self) -> &str {
        match self {
            FormField::Text { name, .. } | FormField::File { name, .. } => name,
        }
    }
}

/// Request body
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body
    Empty,
    /// JSON-encoded bytes
    Json(Vec<u8>),
    /// Multipart form, rebuilt on every attempt
    Multipart(Vec<FormField>),
}

/// A request to a backend path
///
/// Requests are kept as plain data so the client can replay them after a
/// token refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the base URL (e.g. "/user/info")
    pub path: String,
    /// Extra request headers
    pub headers: HashMap<String, String>,
    /// Request body
    pub body: RequestBody,
    /// Whether the auth interceptors apply
    pub authenticated: bool,
}

impl ApiRequest {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HashMap::new(),
            body: RequestBody::Empty,
            authenticated: true,
        }
    }

    /// Create a POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Create a GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set a JSON body
    pub fn json_body<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| ApiError::InvalidInput(format!("unserializable body: {e}")))?;
        self.body = RequestBody::Json(bytes);
        Ok(self)
    }

    /// Set a multipart body
    pub fn multipart(mut self, fields: Vec<FormField>) -> Self {
        self.body = RequestBody::Multipart(fields);
        self
    }

    /// Skip token attachment and auth-failure handling (login, refresh)
    pub fn public(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Successful response
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Response data
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Create a new response
    pub fn new(status: u16, headers: HashMap<String, String>, data: T) -> Self {
        Self { status, headers, data }
    }

    /// Get a header value
    pub fn header(&self, key: &str) -> Option<&String> {
        self.headers.get(key)
    }

    /// Replace the payload, keeping status and headers
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse { status: self.status, headers: self.headers, data: f(self.data) }
    }
}

/// Error body shape used by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
}

/// Response before success/failure classification
#[derive(Debug, Clone)]
pub(crate) struct RawResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RawResponse {
    fn message(&self) -> Option<String> {
        serde_json::from_str::<ErrorBody>(&self.body)
            .ok()
            .and_then(|b| b.message)
    }

    /// 401, or an error response carrying the backend's "token invalid" message
    pub(crate) fn is_auth_failure(&self) -> bool {
        if (200..300).contains(&self.status) {
            return false;
        }
        self.status == 401 || self.message().as_deref() == Some(TOKEN_INVALID_MESSAGE)
    }

    fn into_result(self) -> Result<ApiResponse<String>> {
        if (200..300).contains(&self.status) {
            return Ok(ApiResponse::new(self.status, self.headers, self.body));
        }
        let message = self.message().unwrap_or_else(|| self.body.clone());
        Err(ApiError::Http { status: self.status, message })
    }
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Configuration for [`ApiClient`]
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// API base URL
    pub base_url: String,
    /// Static host serving uploaded photos
    pub upload_url: String,
    /// Placeholder avatar service for demo photo names
    pub placeholder_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Headers included in all requests
    pub default_headers: HashMap<String, String>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            placeholder_url: DEFAULT_PLACEHOLDER_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("Okul-Kocu/{}", env!("CARGO_PKG_VERSION")),
            default_headers: HashMap::new(),
        }
    }
}

impl ApiClientConfig {
    /// Create a config for a base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Default::default() }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a default header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set the photo upload host
    pub fn with_upload_url(mut self, url: impl Into<String>) -> Self {
        self.upload_url = url.into();
        self
    }

    /// Set the placeholder avatar service
    pub fn with_placeholder_url(mut self, url: impl Into<String>) -> Self {
        self.placeholder_url = url.into();
        self
    }

    /// Absolute URL for a path relative to the base URL
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

// =============================================================================
// Client Implementation
// =============================================================================

/// Long-lived HTTP client bound to one base URL
#[derive(Clone)]
pub struct ApiClient {
    client: ReqwestClient,
    config: ApiClientConfig,
    tokens: Arc<TokenStore>,
    refresher: Arc<TokenRefresher>,
    handler: Arc<dyn AuthFailureHandler>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("base_url", &self.config.base_url).finish()
    }
}

impl ApiClient {
    /// Create a client; `handler` hears about refreshed tokens and lost sessions
    pub fn new(
        config: ApiClientConfig,
        tokens: Arc<TokenStore>,
        handler: Arc<dyn AuthFailureHandler>,
    ) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        let refresher = Arc::new(
            TokenRefresher::new(client.clone(), config.url_for("/auth/refresh"), Arc::clone(&tokens))
                .with_headers(config.default_headers.clone()),
        );

        Ok(Self { client, config, tokens, refresher, handler })
    }

    /// Execute a request and return the raw body text
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse<String>> {
        if !request.authenticated {
            return self.dispatch(request, None).await?.into_result();
        }

        let token = self.tokens.get_token().await;
        if token.is_none() {
            tracing::info!(path = %request.path, "no access token stored, sending without Authorization");
        }

        let raw = self.dispatch(request, token.as_deref()).await?;
        if !raw.is_auth_failure() {
            return raw.into_result();
        }

        tracing::info!(path = %request.path, status = raw.status, "token rejected, attempting refresh");
        let fresh = match self.refresher.refresh(token.as_deref()).await {
            Ok(fresh) => fresh,
            Err(ApiError::SessionEnded) => {
                tracing::info!(path = %request.path, "session ended during refresh, request dropped");
                return Err(ApiError::SessionEnded);
            }
            Err(e) => {
                tracing::warn!(path = %request.path, "token refresh failed: {}", e);
                return self.fail_auth().await;
            }
        };
        self.handler.on_token_refreshed(&fresh).await;

        // Only one retry per request; a second rejection ends the session.
        let retried = self.dispatch(request, Some(&fresh)).await?;
        if retried.is_auth_failure() {
            tracing::warn!(path = %request.path, "request rejected again after refresh");
            return self.fail_auth().await;
        }
        retried.into_result()
    }

    /// Execute a request and deserialize the JSON body
    pub async fn send_json<T>(&self, request: &ApiRequest) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.execute(request).await?;
        let data = serde_json::from_str::<T>(&response.data).map_err(|e| {
            tracing::warn!(path = %request.path, "response did not match expected shape: {}", e);
            ApiError::Decode(format!("{}: {}", request.path, e))
        })?;
        Ok(response.map(|_| data))
    }

    /// Execute a request and return the JSON body as a value
    pub async fn send_value(&self, request: &ApiRequest) -> Result<ApiResponse<serde_json::Value>> {
        self.send_json(request).await
    }

    /// Execute a request and discard the body
    pub async fn send_empty(&self, request: &ApiRequest) -> Result<u16> {
        Ok(self.execute(request).await?.status)
    }

    async fn fail_auth<T>(&self) -> Result<T> {
        tracing::info!("clearing session after irrecoverable auth failure");
        self.handler.on_auth_failure().await;
        Err(ApiError::Unauthorized)
    }

    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> Result<RawResponse> {
        let url = self.config.url_for(&request.path);

        let mut req = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };

        for (key, value) in &self.config.default_headers {
            req = req.header(key, value);
        }
        for (key, value) in &request.headers {
            req = req.header(key, value);
        }
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        req = match &request.body {
            RequestBody::Empty => req,
            RequestBody::Json(bytes) => req
                .header("Content-Type", "application/json")
                .body(bytes.clone()),
            RequestBody::Multipart(fields) => req.multipart(build_form(fields)?),
        };

        tracing::debug!(method = request.method.as_str(), %url, "sending request");
        let response = req
            .send()
            .await
            .map_err(|e| ApiError::Network(format!("request to {} failed: {}", request.path, e)))?;

        let status = response.status().as_u16();
        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(key.to_string(), value.to_string());
            }
        }
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("failed to read response: {e}")))?;

        Ok(RawResponse { status, headers, body })
    }

    /// Client configuration
    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    /// Token store shared with the session layer
    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }
}

fn build_form(fields: &[FormField]) -> Result<multipart::Form> {
    let mut form = multipart::Form::new();
    for field in fields {
        form = match field {
            FormField::Text { name, value } => form.text(name.clone(), value.clone()),
            FormField::File { name, file_name, mime, bytes } => {
                let part = multipart::Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(mime)
                    .map_err(|e| ApiError::InvalidInput(format!("invalid MIME type {mime}: {e}")))?;
                form.part(name.clone(), part)
            }
        };
    }
    Ok(form)
}

// =============================================================================
// Tests
// =============================================================================
