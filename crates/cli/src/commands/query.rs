//! `gqlc query`: execute a dotted-path selection and print the data.

use anyhow::{Context, Result};
use graphql_client_config::RequestMethod;
use graphql_typed_client::GraphQLClient;

#[tracing::instrument(skip(client))]
pub async fn run(
    client: &GraphQLClient,
    paths: &[String],
    get: bool,
    print_query: bool,
) -> Result<()> {
    let fields = super::selection(paths)?;
    let mut request = client.dynamic_query(fields);
    if get {
        request = request.with_method(RequestMethod::Get);
    }

    if print_query {
        let document = request.document().context("Failed to build query")?;
        eprintln!("{}", document.query);
    }

    let response = request
        .execute()
        .await
        .with_context(|| format!("Query against {} failed", client.config().url))?;

    let data = response
        .into_data()
        .map(graphql_typed_client::DynamicResult::into_inner)
        .unwrap_or_default();
    println!(
        "{}",
        serde_json::to_string_pretty(&data).context("Failed to serialize response data")?
    );
    Ok(())
}
