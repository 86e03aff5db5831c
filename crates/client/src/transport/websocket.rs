//! Default subscription transport: `graphql-transport-ws` over
//! `tokio-tungstenite`.

use super::{SubscriptionConnection, SubscriptionTransport, TransportError};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Sub-protocol negotiated during the handshake.
pub const GRAPHQL_TRANSPORT_WS_PROTOCOL: &str = "graphql-transport-ws";

#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubscriptionTransport for WebSocketTransport {
    #[tracing::instrument(skip(self, headers), fields(headers = headers.len()))]
    async fn connect(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<Box<dyn SubscriptionConnection>, TransportError> {
        let mut request = url.into_client_request().map_err(|e| {
            tracing::error!(error = %e, "Cannot create websocket client request");
            TransportError::WebSocket(format!("Invalid subscription URL '{url}': {e}"))
        })?;

        request.headers_mut().insert(
            SEC_WEBSOCKET_PROTOCOL,
            HeaderValue::from_static(GRAPHQL_TRANSPORT_WS_PROTOCOL),
        );
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::WebSocket(format!("Invalid header '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::WebSocket(format!("Invalid header value: {e}")))?;
            request.headers_mut().insert(name, value);
        }

        let (stream, response) = connect_async(request)
            .await
            .map_err(|e| TransportError::WebSocket(e.to_string()))?;
        tracing::debug!(status = response.status().as_u16(), "WebSocket connected");

        Ok(Box::new(WebSocketConnection { stream }))
    }
}

pub struct WebSocketConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl SubscriptionConnection for WebSocketConnection {
    async fn send(&mut self, message: String) -> Result<(), TransportError> {
        self.stream
            .send(Message::Text(message.into()))
            .await
            .map_err(|e| TransportError::WebSocket(e.to_string()))
    }

    async fn receive(&mut self) -> Result<Option<String>, TransportError> {
        while let Some(frame) = self.stream.next().await {
            match frame.map_err(|e| TransportError::WebSocket(e.to_string()))? {
                Message::Text(text) => return Ok(Some(text.as_str().to_owned())),
                Message::Binary(bytes) => {
                    let text = String::from_utf8(bytes.to_vec()).map_err(|e| {
                        TransportError::Protocol(format!("Binary frame is not UTF-8: {e}"))
                    })?;
                    return Ok(Some(text));
                }
                Message::Close(frame) => {
                    tracing::debug!(?frame, "Server closed the connection");
                    return Ok(None);
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
        Ok(None)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.stream
            .close(None)
            .await
            .map_err(|e| TransportError::WebSocket(e.to_string()))
    }
}
