//! Several queries merged into a single round trip.
//!
//! Each sub-request registers its fields with the batch. The first execution
//! seals the batch, sends the merged document once and keeps the parsed
//! result; every [`BatchQuery`] then slices its own data out of it.

use crate::client::GraphQLClient;
use crate::error::{ClientError, Result};
use crate::response::Response;
use graphql_fields::{Field, GraphQLObject, OperationType, OutputFilter};
use graphql_query::{
    batch_prefix, merge_batch, slice_batch_data, BatchEntry, QueryArgument, QueryDocument,
};
use graphql_response::{DataError, GraphQLDataResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

/// A batch of queries sharing one HTTP request.
///
/// ```no_run
/// # use graphql_fields::{GraphQLObject, Member, ObjectDescriptor};
/// # use graphql_typed_client::GraphQLClient;
/// # #[derive(serde::Deserialize)]
/// # struct Hero { name: String }
/// # impl GraphQLObject for Hero {
/// #     fn descriptor() -> ObjectDescriptor {
/// #         ObjectDescriptor::new("Hero").member(Member::scalar("name"))
/// #     }
/// # }
/// # async fn run(client: GraphQLClient) -> Result<(), Box<dyn std::error::Error>> {
/// let batch = client.create_batch();
/// let first = batch.query::<Hero>()?;
/// let second = batch.query::<Hero>()?;
/// batch.execute().await?;
///
/// let first = first.execute().await?;
/// let second = second.execute().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BatchRequest {
    state: Arc<BatchState>,
}

#[derive(Debug)]
struct BatchState {
    client: GraphQLClient,
    operation: OperationType,
    pending: Mutex<Pending>,
    outcome: OnceCell<BatchOutcome>,
}

#[derive(Debug, Default)]
struct Pending {
    entries: Vec<BatchEntry>,
    sealed: bool,
}

#[derive(Debug)]
struct BatchOutcome {
    document: QueryDocument,
    raw_response: String,
    result: GraphQLDataResult<Value>,
}

impl BatchRequest {
    pub(crate) fn new(client: GraphQLClient, operation: OperationType) -> Self {
        Self {
            state: Arc::new(BatchState {
                client,
                operation,
                pending: Mutex::new(Pending::default()),
                outcome: OnceCell::new(),
            }),
        }
    }

    /// Adds a query selecting every member of `T`.
    ///
    /// # Errors
    ///
    /// [`ClientError::BatchAlreadyExecuted`] once the batch has run, and
    /// field tree build failures.
    pub fn query<T>(&self) -> Result<BatchQuery<T>>
    where
        T: GraphQLObject + DeserializeOwned,
    {
        self.create_http_request(OutputFilter::identity())
    }

    /// Adds a query for `T` narrowed by `filter`.
    ///
    /// # Errors
    ///
    /// [`ClientError::BatchAlreadyExecuted`] once the batch has run, and
    /// field tree build failures.
    pub fn create_http_request<T, U>(&self, filter: OutputFilter<T, U>) -> Result<BatchQuery<T, U>>
    where
        T: GraphQLObject + DeserializeOwned,
    {
        let fields = self.state.client.fields_for(&filter)?;

        let index = self
            .state
            .with_pending(|pending| {
                pending
                    .entries
                    .push(BatchEntry::new(fields.clone(), Vec::new()));
                pending.entries.len() - 1
            })?;
        tracing::debug!(index, "Added query to batch");

        Ok(BatchQuery {
            state: Arc::clone(&self.state),
            index,
            fields,
            filter,
        })
    }

    /// Number of queries added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once execution has started. From then on additions are
    /// rejected, even when the request failed and `execute` may be retried.
    #[must_use]
    pub fn is_executed(&self) -> bool {
        self.state.lock().sealed
    }

    /// Seals the batch and sends every query in one request. Runs at most
    /// once; later calls return immediately.
    ///
    /// # Errors
    ///
    /// Serialization, transport and HTTP status failures of the merged
    /// request. GraphQL errors are reported per query.
    pub async fn execute(&self) -> Result<()> {
        self.state.run().await.map(|_| ())
    }
}

impl BatchState {
    fn lock(&self) -> std::sync::MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_pending<R>(&self, f: impl FnOnce(&mut Pending) -> R) -> Result<R> {
        let mut pending = self.lock();
        if pending.sealed {
            return Err(ClientError::BatchAlreadyExecuted);
        }
        Ok(f(&mut pending))
    }

    async fn run(&self) -> Result<&BatchOutcome> {
        self.outcome.get_or_try_init(|| self.send()).await
    }

    #[tracing::instrument(skip(self))]
    async fn send(&self) -> Result<BatchOutcome> {
        let entries = {
            let mut pending = self.lock();
            pending.sealed = true;
            pending.entries.clone()
        };
        tracing::info!(queries = entries.len(), "Executing batch");

        let document = merge_batch(self.operation, &entries)?;
        let config = self.client.config();
        let request = self.client.transport_request(
            document.to_json(),
            config.method,
            &[],
            config.authorization.as_ref(),
        );
        let (raw_response, result) = self.client.send_document(&document, request).await?;

        Ok(BatchOutcome {
            document,
            raw_response,
            result,
        })
    }
}

/// One query of a [`BatchRequest`].
pub struct BatchQuery<T, U = T> {
    state: Arc<BatchState>,
    index: usize,
    fields: Vec<Field>,
    filter: OutputFilter<T, U>,
}

impl<T, U> std::fmt::Debug for BatchQuery<T, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchQuery")
            .field("index", &self.index)
            .field("fields", &self.fields.len())
            .finish_non_exhaustive()
    }
}

impl<T, U> BatchQuery<T, U>
where
    T: DeserializeOwned,
{
    /// Binds an argument value for this query only.
    ///
    /// # Errors
    ///
    /// [`ClientError::BatchAlreadyExecuted`] once the batch has run.
    pub fn add_argument(
        &self,
        variable_name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<()> {
        let argument = QueryArgument::new(variable_name, value);
        self.state
            .with_pending(|pending| pending.entries[self.index].arguments.push(argument))
    }

    /// This query's response, executing the batch first if needed.
    ///
    /// # Errors
    ///
    /// Batch execution failures, [`ClientError::GraphQLErrors`] for errors
    /// attributed to this query, and decoding failures.
    pub async fn execute(&self) -> Result<Response<U>> {
        let outcome = self.state.run().await?;
        let prefix = batch_prefix(self.index);

        let result = GraphQLDataResult {
            data: outcome
                .result
                .data
                .as_ref()
                .map(|data| slice_batch_data(data, &prefix)),
            errors: errors_for(&outcome.result.errors, &prefix),
            additional_data: outcome.result.additional_data.clone(),
        };

        Response::from_result(
            &outcome.document,
            outcome.raw_response.clone(),
            result,
            &self.fields,
            &self.filter,
        )
    }
}

/// Errors whose path starts at one of this query's fields, plus errors with
/// no path at all.
fn errors_for(errors: &[DataError], prefix: &str) -> Vec<DataError> {
    errors
        .iter()
        .filter(|error| {
            error.path.is_empty() || error.root_key().is_some_and(|key| key.starts_with(prefix))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn error_at(path: serde_json::Value) -> DataError {
        DataError {
            path: serde_json::from_value(path).unwrap(),
            ..DataError::new("failed")
        }
    }

    #[test]
    fn test_errors_attributed_by_prefix() {
        let errors = vec![
            error_at(json!(["batch0_hero", "name"])),
            error_at(json!(["batch1_hero"])),
            error_at(json!([])),
        ];

        let first = errors_for(&errors, &batch_prefix(0));
        assert_eq!(first, vec![errors[0].clone(), errors[2].clone()]);

        let second = errors_for(&errors, &batch_prefix(1));
        assert_eq!(second, vec![errors[1].clone(), errors[2].clone()]);
    }

    #[test]
    fn test_prefix_does_not_match_longer_index() {
        let errors = vec![error_at(json!(["batch10_hero"]))];
        assert!(errors_for(&errors, &batch_prefix(1)).is_empty());
    }
}
