//! reqwest-backed implementation of [`HttpResource`]
//!
//! Authentication is an injected capability: the client asks a
//! [`TokenProvider`] for a bearer token on every request instead of reading
//! ambient global state, so the transport stays independently testable.

use std::sync::Arc;
use std::time::Duration;

use http::Method;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{Error, TransportError};
use crate::transport::{HttpResource, RawResponse};

/// Source of bearer tokens for outgoing requests
///
/// Token refresh is out of scope here; whatever object owns the session
/// implements this and hands the current token to the transport.
pub trait TokenProvider: Send + Sync {
    /// The token to attach, or `None` for an unauthenticated request
    fn bearer_token(&self) -> Option<String>;
}

/// A fixed, optional bearer token
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    /// A provider that always returns the given token
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// A provider that never attaches a token
    #[must_use]
    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl TokenProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// REST client over a single backend base URL
pub struct RestResource {
    http: reqwest::Client,
    base_url: String,
    token: Arc<dyn TokenProvider>,
}

impl RestResource {
    /// Build a client from configuration
    ///
    /// The request timeout and user agent come from [`ClientConfig`];
    /// requests start out unauthenticated until a token provider is
    /// attached with [`Self::with_token_provider`].
    pub fn new(config: &ClientConfig) -> crate::error::Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::InvalidBaseUrl("base URL is empty".to_string()));
        }

        let mut builder =
            reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs));
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let http = builder.build().map_err(|e| Error::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            token: Arc::new(StaticToken::anonymous()),
        })
    }

    /// Attach a token provider for authenticated requests
    #[must_use]
    pub fn with_token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.token = provider;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl HttpResource for RestResource {
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> std::result::Result<RawResponse, TransportError> {
        let url = self.endpoint(path);
        tracing::debug!(%method, %url, query_len = query.len(), "issuing request");

        let mut request = self.http.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.token.bearer_token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(TransportError::from)?;
        let status = response.status();
        let text = response.text().await.map_err(TransportError::from)?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))?
        };

        tracing::debug!(%status, "response received");
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> ClientConfig {
        ClientConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            user_agent: None,
        }
    }

    #[test]
    fn test_endpoint_joins_cleanly() {
        let client = RestResource::new(&config("https://api.example.com/")).unwrap();
        assert_eq!(
            client.endpoint("/vouchers"),
            "https://api.example.com/vouchers"
        );
        assert_eq!(
            client.endpoint("vouchers/42/activate"),
            "https://api.example.com/vouchers/42/activate"
        );
    }

    #[test]
    fn test_empty_base_url_rejected() {
        assert!(matches!(
            RestResource::new(&config("")),
            Err(Error::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_static_token_provider() {
        assert_eq!(
            StaticToken::new("abc").bearer_token().as_deref(),
            Some("abc")
        );
        assert!(StaticToken::anonymous().bearer_token().is_none());
    }
}
