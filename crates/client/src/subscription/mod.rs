//! Long-lived subscription operations over a [`SubscriptionTransport`].
//!
//! [`SubscriptionTransport`]: crate::transport::SubscriptionTransport

mod operation;
mod protocol;

pub use operation::{SubscriptionOperation, SubscriptionState};
pub use protocol::{ClientMessage, ServerError, ServerMessage};

use crate::client::GraphQLClient;
use crate::error::Result;
use graphql_client_config::AuthorizationConfig;
use graphql_fields::{Field, OperationType, OutputFilter};
use graphql_query::{serialize, QueryArgument, QueryDocument};
use operation::Driver;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// A subscription, ready to be started with [`subscribe`](Self::subscribe).
pub struct SubscriptionRequest<T, U = T> {
    client: GraphQLClient,
    fields: Vec<Field>,
    filter: OutputFilter<T, U>,
    arguments: Vec<QueryArgument>,
    headers: Vec<(String, String)>,
    authorization: Option<AuthorizationConfig>,
}

impl<T, U> std::fmt::Debug for SubscriptionRequest<T, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRequest")
            .field("fields", &self.fields.len())
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

impl<T, U> SubscriptionRequest<T, U>
where
    T: DeserializeOwned + Send + 'static,
    U: Send + 'static,
{
    pub(crate) fn new(client: GraphQLClient, fields: Vec<Field>, filter: OutputFilter<T, U>) -> Self {
        let authorization = client.config().authorization.clone();
        Self {
            client,
            fields,
            filter,
            arguments: Vec::new(),
            headers: Vec::new(),
            authorization,
        }
    }

    #[must_use]
    pub fn with_argument(mut self, variable_name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.push(QueryArgument::new(variable_name, value));
        self
    }

    #[must_use]
    pub fn with_directive_argument(
        mut self,
        variable_name: impl Into<String>,
        directive_name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.arguments
            .push(QueryArgument::directive(variable_name, directive_name, value));
        self
    }

    /// Adds a header to the WebSocket handshake.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Credentials sent in the `connection_init` payload.
    #[must_use]
    pub fn with_authorization(mut self, authorization: AuthorizationConfig) -> Self {
        self.authorization = Some(authorization);
        self
    }

    /// # Errors
    ///
    /// Missing required or unknown arguments.
    pub fn document(&self) -> Result<QueryDocument> {
        Ok(serialize(
            &self.fields,
            OperationType::Subscription,
            &self.arguments,
        )?)
    }

    /// Starts the operation on a background task.
    ///
    /// Connection and protocol failures are delivered through the returned
    /// stream and reflected in its [`SubscriptionState`].
    ///
    /// # Errors
    ///
    /// Missing required or unknown arguments.
    #[tracing::instrument(skip(self), fields(fields = self.fields.len()))]
    pub fn subscribe(self) -> Result<SubscriptionOperation<U>> {
        let document = self.document()?;
        let config = self.client.config();

        let mut headers: Vec<(String, String)> = config
            .headers
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        headers.extend(self.headers);

        let init_payload = self
            .authorization
            .map(|authorization| json!({ "Authorization": authorization.header_value() }));

        let driver = Driver {
            transport: self.client.subscription_transport(),
            url: config.subscription_url(),
            headers,
            init_payload,
            document,
            fields: self.fields,
            filter: self.filter,
        };
        Ok(SubscriptionOperation::spawn(driver))
    }
}
