//! Transport seams: the HTTP executor used for queries and mutations and the
//! subscription transport used for long-lived operations.
//!
//! Both are traits so tests (and callers with their own HTTP stack) can swap
//! in a different implementation; [`HttpTransport`] and [`WebSocketTransport`]
//! are the defaults.

mod http;
mod websocket;

pub use http::HttpTransport;
pub use websocket::{WebSocketConnection, WebSocketTransport, GRAPHQL_TRANSPORT_WS_PROTOCOL};

use async_trait::async_trait;
use graphql_client_config::RequestMethod;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// An outgoing HTTP request. `body` is the JSON request envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub url: String,
    pub method: RequestMethod,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl TransportRequest {
    #[must_use]
    pub fn new(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            method: RequestMethod::Post,
            headers: Vec::new(),
            body,
        }
    }

    #[must_use]
    pub const fn with_method(mut self, method: RequestMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Value of the first header named `name`, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A raw HTTP response. Non-success statuses are returned, not raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl TransportResponse {
    #[must_use]
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    #[must_use]
    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Executes one HTTP round trip.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Opens connections for subscription operations.
#[async_trait]
pub trait SubscriptionTransport: Send + Sync {
    async fn connect(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<Box<dyn SubscriptionConnection>, TransportError>;
}

/// One open subscription connection exchanging text frames.
#[async_trait]
pub trait SubscriptionConnection: Send {
    async fn send(&mut self, message: String) -> Result<(), TransportError>;

    /// Next text frame, or `None` once the peer has closed the connection.
    async fn receive(&mut self) -> Result<Option<String>, TransportError>;

    async fn close(&mut self) -> Result<(), TransportError>;
}
