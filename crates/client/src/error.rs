use crate::transport::TransportError;
use graphql_client_config::ConfigError;
use graphql_fields::BuildError;
use graphql_introspect::{IntrospectionError, ValidationError};
use graphql_query::QueryError;
use graphql_response::{DataError, ResponseError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error(transparent)]
    Introspection(#[from] IntrospectionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    /// The server answered with a non-empty `errors` array.
    #[error("GraphQL request failed with {} error(s): {}", .errors.len(), join_messages(.errors))]
    GraphQLErrors {
        query: String,
        errors: Vec<DataError>,
    },

    #[error("Query failed schema validation: {}", join_messages(.errors))]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Batch has already been executed")]
    BatchAlreadyExecuted,

    #[error("Subscription error: {0}")]
    Subscription(String),
}

fn join_messages<E: ToString>(errors: &[E]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ClientError {
    /// Server-reported errors, if this is a GraphQL-level failure.
    #[must_use]
    pub fn graphql_errors(&self) -> &[DataError] {
        match self {
            Self::GraphQLErrors { errors, .. } => errors,
            _ => &[],
        }
    }
}
