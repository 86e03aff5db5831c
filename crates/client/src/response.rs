use crate::error::{ClientError, Result};
use graphql_fields::{Field, OutputFilter};
use graphql_query::QueryDocument;
use graphql_response::GraphQLDataResult;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A successfully decoded response.
///
/// Responses with a non-empty `errors` array never become a `Response`; they
/// surface as [`ClientError::GraphQLErrors`].
#[derive(Debug, Clone, PartialEq)]
pub struct Response<U> {
    query: String,
    variables: Map<String, Value>,
    raw_response: String,
    data: Option<U>,
    additional_data: Map<String, Value>,
}

impl<U> Response<U> {
    /// Decodes `result` as `T` against `fields` and projects it through
    /// `filter`.
    pub(crate) fn from_result<T: DeserializeOwned>(
        document: &QueryDocument,
        raw_response: String,
        result: GraphQLDataResult<Value>,
        fields: &[Field],
        filter: &OutputFilter<T, U>,
    ) -> Result<Self> {
        if result.has_errors() {
            tracing::debug!(errors = result.errors.len(), "Response carries GraphQL errors");
            return Err(ClientError::GraphQLErrors {
                query: document.query.clone(),
                errors: result.errors,
            });
        }

        let decoded = result.decode::<T>(fields)?;
        Ok(Self {
            query: document.query.clone(),
            variables: document.variables.clone(),
            raw_response,
            data: decoded.data.map(|data| filter.project(data)),
            additional_data: decoded.additional_data,
        })
    }

    /// The query text that was sent.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub const fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }

    /// The response body exactly as received.
    #[must_use]
    pub fn raw_response(&self) -> &str {
        &self.raw_response
    }

    /// `None` when the server returned `"data": null` or no data at all.
    #[must_use]
    pub const fn data(&self) -> Option<&U> {
        self.data.as_ref()
    }

    #[must_use]
    pub fn into_data(self) -> Option<U> {
        self.data
    }

    /// Top-level keys other than `data` and `errors`, such as `extensions`.
    #[must_use]
    pub const fn additional_data(&self) -> &Map<String, Value> {
        &self.additional_data
    }
}
