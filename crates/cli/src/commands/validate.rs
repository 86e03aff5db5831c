//! `gqlc validate`: check a dotted-path selection against the schema.

use crate::exit_code::ExitCode;
use crate::OutputFormat;
use anyhow::{Context, Result};
use colored::Colorize;
use graphql_fields::OperationType;
use graphql_introspect::{validate, ValidationError};
use graphql_typed_client::GraphQLClient;
use serde::Serialize;

/// Root operation the selection starts from.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum Operation {
    #[default]
    Query,
    Mutation,
    Subscription,
}

impl From<Operation> for OperationType {
    fn from(operation: Operation) -> Self {
        match operation {
            Operation::Query => Self::Query,
            Operation::Mutation => Self::Mutation,
            Operation::Subscription => Self::Subscription,
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonDiagnostic<'a> {
    code: &'static str,
    path: &'a str,
    message: String,
    fatal: bool,
}

#[tracing::instrument(skip(client))]
pub async fn run(
    client: &GraphQLClient,
    paths: &[String],
    operation: Operation,
    format: OutputFormat,
    quiet: bool,
) -> Result<ExitCode> {
    let fields = super::selection(paths)?;
    let schema = client
        .fetch_schema()
        .await
        .with_context(|| format!("Failed to fetch schema from {}", client.config().url))?;

    let errors = validate(&fields, &schema, operation.into());
    let fatal = errors.iter().filter(|error| error.is_fatal()).count();
    tracing::debug!(errors = errors.len(), fatal, "Validation finished");

    match format {
        OutputFormat::Human => print_human(&errors, fatal, quiet),
        OutputFormat::Json => println!("{}", to_json(&errors)?),
    }

    Ok(if fatal > 0 {
        ExitCode::ValidationError
    } else {
        ExitCode::Success
    })
}

fn print_human(errors: &[ValidationError], fatal: usize, quiet: bool) {
    for error in errors {
        let label = if error.is_fatal() {
            "error".red().bold()
        } else {
            "warning".yellow().bold()
        };
        println!("{label}[{}]: {error}", error.code());
    }

    if quiet {
        return;
    }
    if fatal == 0 {
        println!("{} Selection is valid", "✓".green());
    } else {
        println!("{} {fatal} error(s) found", "✗".red());
    }
}

fn to_json(errors: &[ValidationError]) -> Result<String> {
    let diagnostics: Vec<_> = errors
        .iter()
        .map(|error| JsonDiagnostic {
            code: error.code(),
            path: error.path(),
            message: error.to_string(),
            fatal: error.is_fatal(),
        })
        .collect();
    serde_json::to_string_pretty(&diagnostics).context("Failed to serialize diagnostics")
}
