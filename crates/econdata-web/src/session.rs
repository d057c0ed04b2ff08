//! HTTP transport for the web API.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use econdata_core::{DataError, ProblemDetails, Result};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, trace, warn};

/// Root of the provider's web API.
pub const DEFAULT_BASE_URL: &str = "https://api.macrobondfinancial.com/";

/// Request timeout used by [`HttpSession::new`].
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport used by the web backend.
///
/// Every method fails with [`DataError::Problem`] on a non-success status and returns the
/// parsed JSON body otherwise. A `304 Not Modified` answer is returned as [`Value::Null`].
#[async_trait]
pub trait Session: Send + Sync + fmt::Debug {
    /// Sends a GET request. Repeated keys in `params` become repeated query parameters.
    async fn get_or_raise(&self, path: &str, params: &[(&str, String)]) -> Result<Value>;

    /// Sends a POST request with a JSON body.
    async fn post_or_raise(&self, path: &str, body: &Value) -> Result<Value>;

    /// Sends a DELETE request.
    async fn delete_or_raise(&self, path: &str, params: &[(&str, String)]) -> Result<Value>;
}

/// A [`Session`] over `reqwest`.
///
/// The bearer token is sent as is and never refreshed.
#[derive(Clone)]
pub struct HttpSession {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl fmt::Debug for HttpSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSession")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HttpSession {
    /// Creates a session authenticating with `token`, with a 30 second request timeout.
    ///
    /// # Errors
    /// Returns [`DataError::Network`] if the HTTP client cannot be built, for instance
    /// when the TLS backend fails to initialize.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| DataError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, token))
    }

    /// Creates a session with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: Client, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            token: Some(token.into()),
        }
    }

    /// Creates a session that sends no credentials, for servers that do not need them.
    #[must_use]
    pub fn anonymous(client: Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
        }
    }

    /// Points the session at another API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    /// Returns the API root.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.client.request(method, self.url(path));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, method: Method, path: &str, request: RequestBuilder) -> Result<Value> {
        debug!(method = method.as_str(), path, "Web API request");

        let response = request
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_MODIFIED {
            trace!(path, "Not modified");
            return Ok(Value::Null);
        }

        let text = response
            .text()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        if !status.is_success() {
            warn!(method = method.as_str(), path, status = status.as_u16(), "Web API request failed");
            return Err(
                ProblemDetails::from_response(method.as_str(), path, status.as_u16(), &text).into(),
            );
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| DataError::Parse(format!("{e}: {text}")))
    }
}

#[async_trait]
impl Session for HttpSession {
    async fn get_or_raise(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let request = self.request(Method::GET, path).query(params);
        self.send(Method::GET, path, request).await
    }

    async fn post_or_raise(&self, path: &str, body: &Value) -> Result<Value> {
        let request = self.request(Method::POST, path).json(body);
        self.send(Method::POST, path, request).await
    }

    async fn delete_or_raise(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let request = self.request(Method::DELETE, path).query(params);
        self.send(Method::DELETE, path, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let session = HttpSession::new("token").unwrap();
        assert_eq!(
            session.url("v1/series/fetchseries"),
            "https://api.macrobondfinancial.com/v1/series/fetchseries"
        );

        let session = session.with_base_url("http://localhost:8080");
        assert_eq!(session.base_url(), "http://localhost:8080/");
        assert_eq!(
            session.url("/v1/search/entities"),
            "http://localhost:8080/v1/search/entities"
        );
    }

    #[test]
    fn test_new_builds_client() {
        let session = HttpSession::new("token").unwrap();
        assert_eq!(session.base_url(), DEFAULT_BASE_URL);
        assert_eq!(session.token.as_deref(), Some("token"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = HttpSession::new("secret_token_12345").unwrap();
        let debug_str = format!("{:?}", session);
        assert!(!debug_str.contains("secret_token_12345"));
        assert!(debug_str.contains("[REDACTED]"));

        let anonymous = HttpSession::anonymous(Client::new());
        assert!(!format!("{:?}", anonymous).contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        let session = HttpSession::anonymous(Client::new()).with_base_url("http://127.0.0.1:1");
        let result = session.get_or_raise("v1/series/fetchseries", &[]).await;
        assert!(matches!(result, Err(DataError::Network(_))));
    }
}
