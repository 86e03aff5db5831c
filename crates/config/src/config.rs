use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Default timeout for requests (30 seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default connection timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default authorization scheme.
pub const DEFAULT_AUTHORIZATION_METHOD: &str = "Bearer";

/// Client configuration, as read from `.graphqlclientrc.yml` or equivalent.
///
/// ```yaml
/// url: https://api.example.com/graphql
/// subscriptionUrl: wss://api.example.com/graphql
/// headers:
///   X-Client: my-app
/// authorization:
///   token: secret
/// timeout: 60
/// retry: 2
/// validate: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// HTTP endpoint for queries and mutations.
    pub url: String,

    /// WebSocket endpoint for subscriptions. Derived from `url` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_url: Option<String>,

    /// Extra HTTP headers sent with every request.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization: Option<AuthorizationConfig>,

    /// HTTP method for queries (default: POST). Mutations always use POST.
    #[serde(default)]
    pub method: RequestMethod,

    /// Request timeout in seconds (default: 30).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Connection timeout in seconds (default: 10).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<u64>,

    /// Number of retry attempts on network and 5xx failures (default: 0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<u32>,

    /// Reject queries that fail schema validation before sending them.
    #[serde(default)]
    pub validate: bool,
}

impl ClientConfig {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS))
    }

    #[must_use]
    pub fn retries(&self) -> u32 {
        self.retry.unwrap_or_default()
    }

    /// The subscription endpoint, falling back to `url` with a `ws` scheme.
    #[must_use]
    pub fn subscription_url(&self) -> String {
        if let Some(url) = &self.subscription_url {
            return url.clone();
        }
        if let Some(rest) = self.url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.url.clone()
        }
    }
}

/// Credentials sent in the `Authorization` header as `{method} {token}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationConfig {
    pub token: String,

    /// Scheme placed before the token (default: `Bearer`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl AuthorizationConfig {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            method: None,
        }
    }

    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    #[must_use]
    pub fn method(&self) -> &str {
        self.method.as_deref().unwrap_or(DEFAULT_AUTHORIZATION_METHOD)
    }

    /// The full header value.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("{} {}", self.method(), self.token)
    }
}

/// HTTP method used to send queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    #[default]
    Post,
    Get,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("https://api.example.com/graphql");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.retries(), 0);
        assert_eq!(config.method, RequestMethod::Post);
        assert!(!config.validate);
    }

    #[test]
    fn test_subscription_url_derived_from_url() {
        let secure = ClientConfig::new("https://api.example.com/graphql");
        assert_eq!(secure.subscription_url(), "wss://api.example.com/graphql");

        let plain = ClientConfig::new("http://localhost:4000/graphql");
        assert_eq!(plain.subscription_url(), "ws://localhost:4000/graphql");

        let explicit = ClientConfig {
            subscription_url: Some("ws://other/ws".to_string()),
            ..ClientConfig::new("http://localhost:4000/graphql")
        };
        assert_eq!(explicit.subscription_url(), "ws://other/ws");
    }

    #[test]
    fn test_authorization_header() {
        let auth = AuthorizationConfig::new("abc");
        assert_eq!(auth.header_value(), "Bearer abc");
        assert_eq!(auth.with_method("Token").header_value(), "Token abc");
    }
}
