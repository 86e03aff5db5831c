use super::protocol::{ClientMessage, ServerMessage};
use crate::error::{ClientError, Result};
use crate::response::Response;
use crate::transport::{SubscriptionConnection, SubscriptionTransport, TransportError};
use futures::Stream;
use graphql_fields::{Field, OutputFilter};
use graphql_query::QueryDocument;
use graphql_response::parse_envelope;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Each connection carries a single operation.
const OPERATION_ID: &str = "1";

/// Lifecycle of a subscription operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionState {
    Connecting,
    Connected,
    /// `connection_init` sent, waiting for `connection_ack`.
    Initializing,
    /// Subscribed and receiving messages.
    Active,
    Reconnecting,
    Stopped,
    Failed,
}

impl SubscriptionState {
    /// Whether the operation has ended for good.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Failed)
    }
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Initializing => "initializing",
            Self::Active => "active",
            Self::Reconnecting => "reconnecting",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Stop,
    Reconnect,
}

/// A running subscription.
///
/// Yields one item per `next` message: the decoded response, or the error
/// that message carried. The stream ends once the operation is stopped,
/// completed by the server, or has failed. Dropping the operation stops it.
pub struct SubscriptionOperation<U> {
    messages: mpsc::UnboundedReceiver<Result<Response<U>>>,
    controls: mpsc::UnboundedSender<Control>,
    state: watch::Receiver<SubscriptionState>,
    task: JoinHandle<()>,
}

impl<U> fmt::Debug for SubscriptionOperation<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionOperation")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl<U: Send + 'static> SubscriptionOperation<U> {
    pub(crate) fn spawn<T>(driver: Driver<T, U>) -> Self
    where
        T: DeserializeOwned + Send + 'static,
    {
        let (message_tx, messages) = mpsc::unbounded_channel();
        let (controls, control_rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(SubscriptionState::Connecting);

        let task = tokio::spawn(driver.run(message_tx, control_rx, state_tx));
        Self {
            messages,
            controls,
            state,
            task,
        }
    }
}

impl<U> SubscriptionOperation<U> {
    #[must_use]
    pub fn state(&self) -> SubscriptionState {
        *self.state.borrow()
    }

    /// A receiver notified on every state transition, independent of the
    /// message stream.
    #[must_use]
    pub fn state_changes(&self) -> watch::Receiver<SubscriptionState> {
        self.state.clone()
    }

    /// Completes the operation and closes the connection.
    pub fn stop(&self) {
        if self.controls.send(Control::Stop).is_err() {
            tracing::trace!("Subscription already finished");
        }
    }

    /// Drops the current connection and subscribes again on a new one.
    pub fn reconnect(&self) {
        if self.controls.send(Control::Reconnect).is_err() {
            tracing::trace!("Subscription already finished");
        }
    }

    /// Stops the operation and waits for the connection to be released.
    pub async fn shutdown(self) {
        self.stop();
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Subscription task ended abnormally");
        }
    }
}

impl<U> Stream for SubscriptionOperation<U> {
    type Item = Result<Response<U>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.messages.poll_recv(cx)
    }
}

/// How one connection ended.
enum SessionEnd {
    Stopped,
    Reconnect,
    Failed(ClientError),
}

/// Owns the connection and feeds the operation's channels.
pub(crate) struct Driver<T, U> {
    pub(crate) transport: Arc<dyn SubscriptionTransport>,
    pub(crate) url: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) init_payload: Option<Value>,
    pub(crate) document: QueryDocument,
    pub(crate) fields: Vec<Field>,
    pub(crate) filter: OutputFilter<T, U>,
}

/// Channels shared by every connection of one operation.
struct Channels<U> {
    messages: mpsc::UnboundedSender<Result<Response<U>>>,
    controls: mpsc::UnboundedReceiver<Control>,
    state: watch::Sender<SubscriptionState>,
}

impl<U> Channels<U> {
    fn set_state(&self, state: SubscriptionState) {
        tracing::debug!(%state, "Subscription state changed");
        self.state.send_replace(state);
    }
}

impl<T, U> Driver<T, U>
where
    T: DeserializeOwned + Send + 'static,
    U: Send + 'static,
{
    #[tracing::instrument(skip_all, fields(url = %self.url))]
    async fn run(
        self,
        messages: mpsc::UnboundedSender<Result<Response<U>>>,
        controls: mpsc::UnboundedReceiver<Control>,
        state: watch::Sender<SubscriptionState>,
    ) {
        let mut channels = Channels {
            messages,
            controls,
            state,
        };

        loop {
            match self.session(&mut channels).await {
                SessionEnd::Reconnect => {
                    tracing::info!("Reconnecting subscription");
                    channels.set_state(SubscriptionState::Reconnecting);
                }
                SessionEnd::Stopped => {
                    channels.set_state(SubscriptionState::Stopped);
                    break;
                }
                SessionEnd::Failed(error) => {
                    tracing::error!(error = %error, "Subscription failed");
                    // The consumer may already be gone.
                    let _ = channels.messages.send(Err(error));
                    channels.set_state(SubscriptionState::Failed);
                    break;
                }
            }
        }
    }

    async fn session(&self, channels: &mut Channels<U>) -> SessionEnd {
        channels.set_state(SubscriptionState::Connecting);
        let mut connection = tokio::select! {
            control = channels.controls.recv() => return interrupted(control),
            connected = self.transport.connect(&self.url, &self.headers) => match connected {
                Ok(connection) => connection,
                Err(e) => return SessionEnd::Failed(e.into()),
            },
        };
        channels.set_state(SubscriptionState::Connected);

        let end = self.drive(connection.as_mut(), channels).await;
        if let Err(e) = connection.close().await {
            tracing::debug!(error = %e, "Closing subscription connection failed");
        }
        end
    }

    async fn drive(
        &self,
        connection: &mut dyn SubscriptionConnection,
        channels: &mut Channels<U>,
    ) -> SessionEnd {
        channels.set_state(SubscriptionState::Initializing);
        let init = ClientMessage::ConnectionInit {
            payload: self.init_payload.clone(),
        };
        if let Err(e) = send(connection, &init).await {
            return SessionEnd::Failed(e);
        }
        tokio::select! {
            control = channels.controls.recv() => return interrupted(control),
            acked = self.await_ack(connection) => {
                if let Err(e) = acked {
                    return SessionEnd::Failed(e);
                }
            }
        }

        let subscribe = ClientMessage::Subscribe {
            id: OPERATION_ID.to_string(),
            payload: self.document.clone(),
        };
        if let Err(e) = send(connection, &subscribe).await {
            return SessionEnd::Failed(e);
        }
        channels.set_state(SubscriptionState::Active);

        loop {
            tokio::select! {
                control = channels.controls.recv() => {
                    let end = interrupted(control);
                    let complete = ClientMessage::Complete { id: OPERATION_ID.to_string() };
                    if let Err(e) = send(connection, &complete).await {
                        tracing::debug!(error = %e, "Sending complete failed");
                    }
                    return end;
                }
                frame = connection.receive() => {
                    let text = match frame {
                        Ok(Some(text)) => text,
                        Ok(None) => {
                            return SessionEnd::Failed(ClientError::Subscription(
                                "Connection closed by the server".to_string(),
                            ));
                        }
                        Err(e) => return SessionEnd::Failed(e.into()),
                    };
                    if let Some(end) = self.handle_frame(connection, channels, &text).await {
                        return end;
                    }
                }
            }
        }
    }

    async fn await_ack(&self, connection: &mut dyn SubscriptionConnection) -> Result<()> {
        loop {
            let Some(text) = connection.receive().await? else {
                return Err(ClientError::Subscription(
                    "Connection closed before connection_ack".to_string(),
                ));
            };
            match parse_frame(&text)? {
                ServerMessage::ConnectionAck { .. } => {
                    tracing::debug!("Connection acknowledged");
                    return Ok(());
                }
                ServerMessage::Ping { payload } => {
                    send(connection, &ClientMessage::Pong { payload }).await?;
                }
                ServerMessage::KeepAlive | ServerMessage::Pong { .. } => {}
                ServerMessage::Error { payload, .. } => {
                    return Err(ClientError::GraphQLErrors {
                        query: self.document.query.clone(),
                        errors: payload.into(),
                    });
                }
                other => {
                    return Err(TransportError::Protocol(format!(
                        "Expected connection_ack, received {other:?}"
                    ))
                    .into());
                }
            }
        }
    }

    /// Handles one frame of an active operation; `Some` ends the session.
    async fn handle_frame(
        &self,
        connection: &mut dyn SubscriptionConnection,
        channels: &Channels<U>,
        text: &str,
    ) -> Option<SessionEnd> {
        let message = match parse_frame(text) {
            Ok(message) => message,
            Err(e) => return Some(SessionEnd::Failed(e)),
        };

        match message {
            ServerMessage::Next { id, payload } if id == OPERATION_ID => {
                let response = self.decode(payload);
                if channels.messages.send(response).is_err() {
                    tracing::debug!("Subscription consumer dropped");
                    return Some(SessionEnd::Stopped);
                }
                None
            }
            ServerMessage::Error { payload, .. } => Some(SessionEnd::Failed(
                ClientError::GraphQLErrors {
                    query: self.document.query.clone(),
                    errors: payload.into(),
                },
            )),
            ServerMessage::Complete { id } if id == OPERATION_ID => {
                tracing::info!("Server completed the subscription");
                Some(SessionEnd::Stopped)
            }
            ServerMessage::Ping { payload } => {
                match send(connection, &ClientMessage::Pong { payload }).await {
                    Ok(()) => None,
                    Err(e) => Some(SessionEnd::Failed(e)),
                }
            }
            other => {
                tracing::trace!(?other, "Ignoring frame");
                None
            }
        }
    }

    fn decode(&self, payload: Value) -> Result<Response<U>> {
        let raw_response = payload.to_string();
        let result = parse_envelope(payload)?;
        Response::from_result(&self.document, raw_response, result, &self.fields, &self.filter)
    }
}

/// How a session ends when a control arrives. A closed control channel
/// means the operation was dropped.
fn interrupted(control: Option<Control>) -> SessionEnd {
    match control {
        Some(Control::Reconnect) => SessionEnd::Reconnect,
        Some(Control::Stop) | None => SessionEnd::Stopped,
    }
}

fn parse_frame(text: &str) -> Result<ServerMessage> {
    ServerMessage::from_text(text)
        .map_err(|e| TransportError::Protocol(format!("Invalid frame: {e}")).into())
}

async fn send(connection: &mut dyn SubscriptionConnection, message: &ClientMessage) -> Result<()> {
    let text = message
        .to_text()
        .map_err(|e| TransportError::Protocol(format!("Cannot encode frame: {e}")))?;
    connection.send(text).await?;
    Ok(())
}
