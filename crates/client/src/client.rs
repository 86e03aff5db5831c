//! The client factory: builds typed requests, batches and subscriptions on
//! top of the configured transports.

use crate::batch::BatchRequest;
use crate::error::{ClientError, Result};
use crate::request::HttpRequest;
use crate::subscription::SubscriptionRequest;
use crate::transport::{
    HttpExecutor, HttpTransport, SubscriptionTransport, TransportRequest, TransportResponse,
    WebSocketTransport,
};
use graphql_client_config::{AuthorizationConfig, ClientConfig, RequestMethod};
use graphql_fields::{Field, FieldCache, GraphQLObject, OperationType, OutputFilter};
use graphql_introspect::{
    introspection_request, parse_introspection, validate, IntrospectionSchema, ValidationError,
};
use graphql_query::QueryDocument;
use graphql_response::{parse_response, DynamicResult, GraphQLDataResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Typed GraphQL client.
///
/// Cloning is cheap; clones share transports, the field cache and the
/// schema cache.
///
/// ```no_run
/// use graphql_fields::{GraphQLObject, Member, ObjectDescriptor};
/// use graphql_typed_client::GraphQLClient;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Query {
///     hello: Option<String>,
/// }
///
/// impl GraphQLObject for Query {
///     fn descriptor() -> ObjectDescriptor {
///         ObjectDescriptor::new("Query").member(Member::scalar("hello"))
///     }
/// }
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GraphQLClient::new("https://api.example.com/graphql");
/// let response = client.query::<Query>()?.execute().await?;
/// println!("{:?}", response.data().and_then(|q| q.hello.as_deref()));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GraphQLClient {
    config: Arc<ClientConfig>,
    executor: Arc<dyn HttpExecutor>,
    subscriptions: Arc<dyn SubscriptionTransport>,
    cache: Arc<FieldCache>,
    schema: Arc<Mutex<Option<Arc<IntrospectionSchema>>>>,
}

impl fmt::Debug for GraphQLClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphQLClient")
            .field("url", &self.config.url)
            .field("cached_types", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl GraphQLClient {
    /// A client for `url` with default transports and settings.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self::from_config(ClientConfig::new(url))
    }

    /// A client using `config` for endpoints, headers, authorization,
    /// timeouts, retries and validation.
    #[must_use]
    pub fn from_config(config: ClientConfig) -> Self {
        let executor = HttpTransport::from_config(&config);
        Self {
            config: Arc::new(config),
            executor: Arc::new(executor),
            subscriptions: Arc::new(WebSocketTransport::new()),
            cache: Arc::new(FieldCache::new()),
            schema: Arc::new(Mutex::new(None)),
        }
    }

    /// Replaces the HTTP transport.
    #[must_use]
    pub fn with_executor(mut self, executor: impl HttpExecutor + 'static) -> Self {
        self.executor = Arc::new(executor);
        self
    }

    /// Replaces the subscription transport.
    #[must_use]
    pub fn with_subscription_transport(
        mut self,
        transport: impl SubscriptionTransport + 'static,
    ) -> Self {
        self.subscriptions = Arc::new(transport);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// A query selecting every member of `T`.
    ///
    /// # Errors
    ///
    /// [`ClientError::Build`] when `T` cannot be turned into a field tree.
    pub fn query<T>(&self) -> Result<HttpRequest<T>>
    where
        T: GraphQLObject + DeserializeOwned,
    {
        self.create_http_request(OperationType::Query, OutputFilter::identity())
    }

    /// A mutation selecting every member of `T`.
    ///
    /// # Errors
    ///
    /// [`ClientError::Build`] when `T` cannot be turned into a field tree.
    pub fn mutation<T>(&self) -> Result<HttpRequest<T>>
    where
        T: GraphQLObject + DeserializeOwned,
    {
        self.create_http_request(OperationType::Mutation, OutputFilter::identity())
    }

    /// A request for `T` narrowed by `filter`: only the fields the filter
    /// reads are sent, and the decoded value is projected to `U`.
    ///
    /// # Errors
    ///
    /// [`ClientError::Build`] when `T` cannot be turned into a field tree.
    pub fn create_http_request<T, U>(
        &self,
        operation: OperationType,
        filter: OutputFilter<T, U>,
    ) -> Result<HttpRequest<T, U>>
    where
        T: GraphQLObject + DeserializeOwned,
    {
        let fields = self.fields_for(&filter)?;
        Ok(HttpRequest::new(self.clone(), operation, fields, filter))
    }

    /// An untyped query for a selection built at runtime.
    #[must_use]
    pub fn dynamic_query(&self, fields: Vec<Field>) -> HttpRequest<DynamicResult> {
        HttpRequest::new(
            self.clone(),
            OperationType::Query,
            fields,
            OutputFilter::identity(),
        )
    }

    /// A batch of queries sent in one round trip.
    #[must_use]
    pub fn create_batch(&self) -> BatchRequest {
        BatchRequest::new(self.clone(), OperationType::Query)
    }

    /// A subscription selecting every member of `T`.
    ///
    /// # Errors
    ///
    /// [`ClientError::Build`] when `T` cannot be turned into a field tree.
    pub fn subscription<T>(&self) -> Result<SubscriptionRequest<T>>
    where
        T: GraphQLObject + DeserializeOwned + Send + 'static,
    {
        self.create_subscription(OutputFilter::identity())
    }

    /// A subscription for `T` narrowed by `filter`.
    ///
    /// # Errors
    ///
    /// [`ClientError::Build`] when `T` cannot be turned into a field tree.
    pub fn create_subscription<T, U>(
        &self,
        filter: OutputFilter<T, U>,
    ) -> Result<SubscriptionRequest<T, U>>
    where
        T: GraphQLObject + DeserializeOwned + Send + 'static,
        U: Send + 'static,
    {
        let fields = self.fields_for(&filter)?;
        Ok(SubscriptionRequest::new(self.clone(), fields, filter))
    }

    /// Fetches the schema by introspection, or returns the cached copy.
    ///
    /// # Errors
    ///
    /// Transport failures, non-success statuses and malformed introspection
    /// results.
    #[tracing::instrument(skip(self), fields(url = %self.config.url))]
    pub async fn fetch_schema(&self) -> Result<Arc<IntrospectionSchema>> {
        let mut cached = self.schema.lock().await;
        if let Some(schema) = cached.as_ref() {
            tracing::trace!("Using cached schema");
            return Ok(Arc::clone(schema));
        }

        tracing::info!("Fetching schema");
        let request = self.transport_request(
            introspection_request(),
            RequestMethod::Post,
            &[],
            self.config.authorization.as_ref(),
        );
        let response = self.send(request).await?;
        let schema = Arc::new(parse_introspection(&response.body)?);
        tracing::info!(types = schema.types.len(), "Schema fetched");

        *cached = Some(Arc::clone(&schema));
        Ok(schema)
    }

    /// Drops the cached schema; the next validation fetches it again.
    pub async fn invalidate_schema(&self) {
        self.schema.lock().await.take();
    }

    /// Validates the selection of `T` against the server schema without
    /// executing it.
    ///
    /// # Errors
    ///
    /// Build failures and schema fetch failures. Validation findings are
    /// returned, not raised.
    pub async fn validate_query<T: GraphQLObject>(
        &self,
        operation: OperationType,
    ) -> Result<Vec<ValidationError>> {
        let fields = self.cache.get_or_build::<T>()?;
        self.validate_fields(&fields, operation).await
    }

    pub(crate) async fn validate_fields(
        &self,
        fields: &[Field],
        operation: OperationType,
    ) -> Result<Vec<ValidationError>> {
        let schema = self.fetch_schema().await?;
        Ok(validate(fields, &schema, operation))
    }

    pub(crate) fn fields_for<T: GraphQLObject, U>(
        &self,
        filter: &OutputFilter<T, U>,
    ) -> Result<Vec<Field>> {
        let fields = self.cache.get_or_build::<T>()?;
        Ok(filter.apply_to_fields(&fields))
    }

    pub(crate) fn transport_request(
        &self,
        body: Value,
        method: RequestMethod,
        headers: &[(String, String)],
        authorization: Option<&AuthorizationConfig>,
    ) -> TransportRequest {
        let mut request = TransportRequest::new(self.config.url.clone(), body).with_method(method);
        request.headers.extend(headers.iter().cloned());
        if let Some(authorization) = authorization {
            request = request.with_header("Authorization", authorization.header_value());
        }
        request
    }

    /// Executes `request` and fails on non-success statuses.
    pub(crate) async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let response = self.executor.execute(request).await?;
        if response.is_success() {
            return Ok(response);
        }

        tracing::error!(status = response.status, "GraphQL endpoint returned an error status");
        Err(status_error(response))
    }

    /// Sends `document` and parses the response envelope.
    pub(crate) async fn send_document(
        &self,
        document: &QueryDocument,
        request: TransportRequest,
    ) -> Result<(String, GraphQLDataResult<Value>)> {
        tracing::debug!(query = %document.query, "Sending operation");
        let response = match self.send(request).await {
            Err(ClientError::GraphQLErrors { errors, .. }) => {
                return Err(ClientError::GraphQLErrors {
                    query: document.query.clone(),
                    errors,
                })
            }
            other => other?,
        };
        let result = parse_response(&response.body)?;
        Ok((response.body, result))
    }

    pub(crate) fn subscription_transport(&self) -> Arc<dyn SubscriptionTransport> {
        Arc::clone(&self.subscriptions)
    }
}

/// Servers often report request-level failures as a GraphQL errors envelope
/// with a 4xx status; prefer those errors over the bare status.
fn status_error(response: TransportResponse) -> ClientError {
    match parse_response(&response.body) {
        Ok(result) if result.has_errors() => ClientError::GraphQLErrors {
            query: String::new(),
            errors: result.errors,
        },
        _ => ClientError::Http {
            status: response.status,
            body: response.body,
        },
    }
}
