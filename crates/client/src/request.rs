use crate::client::GraphQLClient;
use crate::error::{ClientError, Result};
use crate::response::Response;
use graphql_client_config::{AuthorizationConfig, RequestMethod};
use graphql_fields::{Field, OperationType, OutputFilter};
use graphql_introspect::ValidationError;
use graphql_query::{serialize, QueryArgument, QueryDocument};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// One query or mutation, ready to be sent.
///
/// Settings default to the client's configuration and can be overridden per
/// request.
pub struct HttpRequest<T, U = T> {
    client: GraphQLClient,
    operation: OperationType,
    fields: Vec<Field>,
    filter: OutputFilter<T, U>,
    arguments: Vec<QueryArgument>,
    headers: Vec<(String, String)>,
    authorization: Option<AuthorizationConfig>,
    method: RequestMethod,
    throw_if_invalid: bool,
}

impl<T, U> std::fmt::Debug for HttpRequest<T, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRequest")
            .field("operation", &self.operation)
            .field("fields", &self.fields.len())
            .field("arguments", &self.arguments)
            .field("method", &self.method)
            .field("throw_if_invalid", &self.throw_if_invalid)
            .finish_non_exhaustive()
    }
}

impl<T, U> HttpRequest<T, U>
where
    T: DeserializeOwned,
{
    pub(crate) fn new(
        client: GraphQLClient,
        operation: OperationType,
        fields: Vec<Field>,
        filter: OutputFilter<T, U>,
    ) -> Self {
        let config = client.config();
        let authorization = config.authorization.clone();
        let method = config.method;
        let throw_if_invalid = config.validate;
        Self {
            client,
            operation,
            fields,
            filter,
            arguments: Vec::new(),
            headers: Vec::new(),
            authorization,
            method,
            throw_if_invalid,
        }
    }

    /// Binds a value to the variable `variable_name`.
    #[must_use]
    pub fn with_argument(mut self, variable_name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.push(QueryArgument::new(variable_name, value));
        self
    }

    /// Binds a serializable value, such as an input object struct.
    ///
    /// # Errors
    ///
    /// Fails when `value` cannot be represented as JSON.
    pub fn with_serialized_argument<V: Serialize + ?Sized>(
        mut self,
        variable_name: impl Into<String>,
        value: &V,
    ) -> serde_json::Result<Self> {
        self.arguments
            .push(QueryArgument::from_serialize(variable_name, value)?);
        Ok(self)
    }

    /// Binds a value to a variable of the directive `directive_name`.
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

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_authorization(mut self, authorization: AuthorizationConfig) -> Self {
        self.authorization = Some(authorization);
        self
    }

    /// HTTP method for queries. Mutations are always sent with POST.
    #[must_use]
    pub const fn with_method(mut self, method: RequestMethod) -> Self {
        self.method = method;
        self
    }

    /// Validate against the schema before sending, failing with
    /// [`ClientError::ValidationFailed`] on fatal findings.
    #[must_use]
    pub const fn throw_if_invalid(mut self, enabled: bool) -> Self {
        self.throw_if_invalid = enabled;
        self
    }

    /// The selection that will be sent.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Renders the request envelope without sending it.
    ///
    /// # Errors
    ///
    /// Missing required or unknown arguments.
    pub fn document(&self) -> Result<QueryDocument> {
        Ok(serialize(&self.fields, self.operation, &self.arguments)?)
    }

    /// Checks the selection against the server schema.
    ///
    /// # Errors
    ///
    /// Schema fetch failures. Findings are returned, not raised.
    pub async fn validate(&self) -> Result<Vec<ValidationError>> {
        self.client.validate_fields(&self.fields, self.operation).await
    }

    /// Sends the request and decodes the response.
    ///
    /// # Errors
    ///
    /// - Serialization, validation, transport and HTTP status failures.
    /// - [`ClientError::GraphQLErrors`] when the response has any errors.
    /// - [`ClientError::Response`] when the data does not fit `T`.
    #[tracing::instrument(skip(self), fields(operation = %self.operation, fields = self.fields.len()))]
    pub async fn execute(&self) -> Result<Response<U>> {
        if self.throw_if_invalid {
            let fatal: Vec<ValidationError> = self
                .validate()
                .await?
                .into_iter()
                .filter(ValidationError::is_fatal)
                .collect();
            if !fatal.is_empty() {
                tracing::warn!(errors = fatal.len(), "Query failed validation");
                return Err(ClientError::ValidationFailed { errors: fatal });
            }
        }

        let document = self.document()?;
        let method = match self.operation {
            OperationType::Query => self.method,
            OperationType::Mutation | OperationType::Subscription => RequestMethod::Post,
        };
        let request = self.client.transport_request(
            document.to_json(),
            method,
            &self.headers,
            self.authorization.as_ref(),
        );

        let (raw_response, result) = self.client.send_document(&document, request).await?;
        Response::from_result(&document, raw_response, result, &self.fields, &self.filter)
    }
}
