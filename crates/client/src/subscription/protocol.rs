//! `graphql-transport-ws` message frames.
//!
//! Reference: <https://github.com/enisdenjo/graphql-ws/blob/master/PROTOCOL.md>

use graphql_query::QueryDocument;
use graphql_response::DataError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Frames sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    ConnectionInit {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Subscribe {
        id: String,
        payload: QueryDocument,
    },
    Complete {
        id: String,
    },
    Ping {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Pong {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
}

impl ClientMessage {
    /// Serializes the frame as JSON text.
    ///
    /// # Errors
    ///
    /// Fails only if a payload cannot be represented as JSON.
    pub fn to_text(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Frames received from the server. Legacy `subscriptions-transport-ws`
/// names are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    ConnectionAck {
        #[serde(default)]
        payload: Option<Value>,
    },
    #[serde(alias = "data")]
    Next { id: String, payload: Value },
    #[serde(alias = "connection_error")]
    Error {
        #[serde(default)]
        id: Option<String>,
        payload: ServerError,
    },
    Complete { id: String },
    #[serde(alias = "ka")]
    KeepAlive,
    Ping {
        #[serde(default)]
        payload: Option<Value>,
    },
    Pong {
        #[serde(default)]
        payload: Option<Value>,
    },
}

impl ServerMessage {
    /// Parses a text frame.
    ///
    /// # Errors
    ///
    /// Fails when the frame is not JSON or has an unknown `type`.
    pub fn from_text(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Error payload; servers send either one error or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerError {
    Errors(Vec<DataError>),
    Error(DataError),
}

impl From<ServerError> for Vec<DataError> {
    fn from(value: ServerError) -> Self {
        match value {
            ServerError::Error(error) => vec![error],
            ServerError::Errors(errors) => errors,
        }
    }
}
