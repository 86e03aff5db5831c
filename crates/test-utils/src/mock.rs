//! In-memory transports for exercising the client without a server.

use crate::tracking::RequestLog;
use async_trait::async_trait;
use graphql_typed_client::{
    HttpExecutor, SubscriptionConnection, SubscriptionTransport, TransportError, TransportRequest,
    TransportResponse,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// HTTP executor answering from a queue of canned responses.
///
/// Every request is recorded; an empty queue answers with a network error.
#[derive(Debug, Clone, Default)]
pub struct MockHttpExecutor {
    responses: Arc<Mutex<VecDeque<Result<TransportResponse, TransportError>>>>,
    requests: RequestLog<TransportRequest>,
}

impl MockHttpExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a `200 OK` with `body` serialized as JSON.
    #[must_use]
    pub fn with_json(self, body: &Value) -> Self {
        self.with_response(TransportResponse::ok(body.to_string()))
    }

    #[must_use]
    pub fn with_response(self, response: TransportResponse) -> Self {
        self.push(Ok(response));
        self
    }

    #[must_use]
    pub fn with_error(self, error: TransportError) -> Self {
        self.push(Err(error));
        self
    }

    /// Everything executed so far.
    #[must_use]
    pub fn requests(&self) -> &RequestLog<TransportRequest> {
        &self.requests
    }

    /// Number of queued responses not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.lock().len()
    }

    fn push(&self, response: Result<TransportResponse, TransportError>) {
        self.lock().push_back(response);
    }

    fn lock(
        &self,
    ) -> std::sync::MutexGuard<'_, VecDeque<Result<TransportResponse, TransportError>>> {
        self.responses.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl HttpExecutor for MockHttpExecutor {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests.record(request);
        self.lock().pop_front().unwrap_or_else(|| {
            Err(TransportError::Network(
                "No mock response queued".to_string(),
            ))
        })
    }
}

/// Server frames for scripted subscription sessions.
pub mod frames {
    use serde_json::{json, Value};

    #[must_use]
    pub fn ack() -> Value {
        json!({"type": "connection_ack"})
    }

    /// A `next` frame for the client's single operation.
    #[must_use]
    pub fn next(data: &Value) -> Value {
        json!({"type": "next", "id": "1", "payload": {"data": data}})
    }

    /// A `next` frame whose payload carries GraphQL errors.
    #[must_use]
    pub fn next_with_errors(message: &str) -> Value {
        json!({"type": "next", "id": "1", "payload": {"data": null, "errors": [{"message": message}]}})
    }

    #[must_use]
    pub fn error(message: &str) -> Value {
        json!({"type": "error", "id": "1", "payload": [{"message": message}]})
    }

    #[must_use]
    pub fn complete() -> Value {
        json!({"type": "complete", "id": "1"})
    }

    #[must_use]
    pub fn ping() -> Value {
        json!({"type": "ping"})
    }
}

/// What happened on one mock connection.
#[derive(Debug, Clone)]
pub struct ConnectionRecord {
    pub url: String,
    pub headers: Vec<(String, String)>,
    sent: RequestLog<String>,
    closed: Arc<AtomicBool>,
}

impl ConnectionRecord {
    /// Client frames sent on this connection, parsed as JSON.
    #[must_use]
    pub fn sent_frames(&self) -> Vec<Value> {
        self.sent
            .all()
            .iter()
            .filter_map(|text| serde_json::from_str(text).ok())
            .collect()
    }

    /// The `type` of each client frame, in order.
    #[must_use]
    pub fn sent_types(&self) -> Vec<String> {
        self.sent_frames()
            .iter()
            .filter_map(|frame| frame.get("type").and_then(Value::as_str).map(str::to_string))
            .collect()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Subscription transport replaying one scripted session per connection.
///
/// Scripted frames are delivered in order. Once a script runs out the
/// connection stays open and silent until the client closes it. Connecting
/// with no script left fails.
#[derive(Debug, Clone, Default)]
pub struct MockSubscriptionTransport {
    sessions: Arc<Mutex<VecDeque<Vec<Value>>>>,
    connections: RequestLog<ConnectionRecord>,
}

impl MockSubscriptionTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the frames the server sends on the next connection.
    #[must_use]
    pub fn with_session(self, frames: impl IntoIterator<Item = Value>) -> Self {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(frames.into_iter().collect());
        self
    }

    /// Every connection opened so far.
    #[must_use]
    pub fn connections(&self) -> Vec<ConnectionRecord> {
        self.connections.all()
    }
}

#[async_trait]
impl SubscriptionTransport for MockSubscriptionTransport {
    async fn connect(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<Box<dyn SubscriptionConnection>, TransportError> {
        let script = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| TransportError::WebSocket("Connection refused".to_string()))?;

        let record = ConnectionRecord {
            url: url.to_string(),
            headers: headers.to_vec(),
            sent: RequestLog::default(),
            closed: Arc::new(AtomicBool::new(false)),
        };
        self.connections.record(record.clone());

        Ok(Box::new(MockConnection {
            script: script.into(),
            record,
        }))
    }
}

struct MockConnection {
    script: VecDeque<Value>,
    record: ConnectionRecord,
}

#[async_trait]
impl SubscriptionConnection for MockConnection {
    async fn send(&mut self, message: String) -> Result<(), TransportError> {
        if self.record.is_closed() {
            return Err(TransportError::WebSocket("Connection closed".to_string()));
        }
        self.record.sent.record(message);
        Ok(())
    }

    async fn receive(&mut self) -> Result<Option<String>, TransportError> {
        match self.script.pop_front() {
            Some(frame) => Ok(Some(frame.to_string())),
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.record.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
