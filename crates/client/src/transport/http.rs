//! Default HTTP executor built on `reqwest`.

use super::{HttpExecutor, TransportError, TransportRequest, TransportResponse};
use async_trait::async_trait;
use graphql_client_config::{
    ClientConfig, RequestMethod, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS,
};
use serde_json::Value;
use std::time::Duration;

/// HTTP executor with custom headers, timeouts and retries.
///
/// Network failures and 5xx responses are retried with exponential backoff
/// (1s, 2s, 4s, ...). The final response is returned whatever its status.
///
/// ```no_run
/// use graphql_typed_client::HttpTransport;
/// use std::time::Duration;
///
/// let transport = HttpTransport::new()
///     .with_header("X-API-Key", "my-api-key")
///     .with_timeout(Duration::from_secs(60))
///     .with_retries(3);
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    headers: Vec<(String, String)>,
    timeout: Duration,
    connect_timeout: Duration,
    retries: u32,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            headers: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            retries: 0,
        }
    }

    /// Transport settings from a client config. Config headers become
    /// default headers of every request.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new()
            .with_headers(config.headers.clone())
            .with_timeout(config.timeout())
            .with_connect_timeout(config.connect_timeout())
            .with_retries(config.retries())
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(name, value)| (name.into(), value.into())));
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Number of additional attempts after the first one fails.
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    #[must_use]
    pub const fn retries(&self) -> u32 {
        self.retries
    }

    fn is_retryable(outcome: &Result<TransportResponse, TransportError>) -> bool {
        match outcome {
            Ok(response) => response.status >= 500,
            Err(TransportError::Network(_)) => true,
            Err(TransportError::WebSocket(_) | TransportError::Protocol(_)) => false,
        }
    }

    fn build_client(&self) -> Result<reqwest::Client, TransportError> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(|e| TransportError::Network(format!("Failed to create HTTP client: {e}")))
    }

    async fn execute_once(
        &self,
        client: &reqwest::Client,
        request: &TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        let mut builder = match request.method {
            RequestMethod::Post => client
                .post(&request.url)
                .header("Content-Type", "application/json")
                .json(&request.body),
            RequestMethod::Get => client.get(get_url(&request.url, &request.body)?),
        };

        for (name, value) in self.headers.iter().chain(&request.headers) {
            builder = builder.header(name, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

/// Encodes the request envelope as `?query=...&variables=...`.
fn get_url(url: &str, body: &Value) -> Result<reqwest::Url, TransportError> {
    let mut url = reqwest::Url::parse(url)
        .map_err(|e| TransportError::Network(format!("Invalid URL '{url}': {e}")))?;
    {
        let mut pairs = url.query_pairs_mut();
        if let Some(query) = body.get("query").and_then(Value::as_str) {
            pairs.append_pair("query", query);
        }
        if let Some(variables) = body.get("variables").filter(|v| !v.is_null()) {
            pairs.append_pair("variables", &variables.to_string());
        }
    }
    Ok(url)
}

#[async_trait]
impl HttpExecutor for HttpTransport {
    #[tracing::instrument(skip(self, request), fields(url = %request.url, method = ?request.method))]
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let client = self.build_client()?;
        let attempts = self.retries + 1;
        let mut outcome = Err(TransportError::Network("No attempts made".to_string()));

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1));
                tracing::info!(
                    attempt,
                    delay_secs = delay.as_secs(),
                    "Retrying after delay"
                );
                tokio::time::sleep(delay).await;
            }

            outcome = self.execute_once(&client, &request).await;
            match &outcome {
                Ok(response) if response.status < 500 => {
                    tracing::debug!(status = response.status, "Response received");
                    break;
                }
                Ok(response) => tracing::warn!(attempt, status = response.status, "Server error"),
                Err(e) => tracing::warn!(attempt, error = %e, "Request failed"),
            }

            if !Self::is_retryable(&outcome) {
                break;
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transport_default() {
        let transport = HttpTransport::new();
        assert!(transport.headers().is_empty());
        assert_eq!(transport.timeout, Duration::from_secs(30));
        assert_eq!(transport.connect_timeout, Duration::from_secs(10));
        assert_eq!(transport.retries(), 0);
    }

    #[test]
    fn test_transport_from_config() {
        let mut config = ClientConfig::new("https://api.example.com/graphql");
        config.headers.insert("X-Client".to_string(), "tests".to_string());
        config.timeout = Some(5);
        config.retry = Some(2);

        let transport = HttpTransport::from_config(&config);
        assert_eq!(
            transport.headers(),
            &[("X-Client".to_string(), "tests".to_string())]
        );
        assert_eq!(transport.timeout, Duration::from_secs(5));
        assert_eq!(transport.retries(), 2);
    }

    #[test]
    fn test_is_retryable() {
        let response = |status| Ok(TransportResponse::with_status(status, ""));
        assert!(HttpTransport::is_retryable(&Err(TransportError::Network(
            "timeout".into()
        ))));
        assert!(HttpTransport::is_retryable(&response(500)));
        assert!(HttpTransport::is_retryable(&response(503)));
        assert!(!HttpTransport::is_retryable(&response(200)));
        assert!(!HttpTransport::is_retryable(&response(401)));
        assert!(!HttpTransport::is_retryable(&response(404)));
        assert!(!HttpTransport::is_retryable(&Err(TransportError::Protocol(
            "bad frame".into()
        ))));
    }

    #[test]
    fn test_get_url_encodes_envelope() {
        let url = get_url(
            "https://api.example.com/graphql",
            &json!({"query": "query{hero{name}}", "variables": {"id": 1}}),
        )
        .unwrap();

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("query".to_string(), "query{hero{name}}".to_string()),
                ("variables".to_string(), r#"{"id":1}"#.to_string()),
            ]
        );
    }

    #[test]
    fn test_get_url_rejects_relative_url() {
        let result = get_url("/graphql", &json!({"query": "query{a}"}));
        assert!(matches!(result, Err(TransportError::Network(_))));
    }
}
