//! `gqlc introspect`: fetch and print the endpoint's schema.

use anyhow::{Context, Result};
use colored::Colorize;
use graphql_fields::OperationType;
use graphql_introspect::{IntrospectionSchema, IntrospectionType};
use graphql_typed_client::GraphQLClient;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum SchemaFormat {
    /// Introspection JSON (`__schema`)
    #[default]
    Json,
    /// Root types and type counts
    Summary,
}

#[tracing::instrument(skip(client))]
pub async fn run(
    client: &GraphQLClient,
    output: Option<PathBuf>,
    format: SchemaFormat,
) -> Result<()> {
    let start_time = std::time::Instant::now();
    let url = &client.config().url;

    let schema = client
        .fetch_schema()
        .await
        .with_context(|| format!("Failed to fetch schema from {url}"))?;

    let content = match format {
        SchemaFormat::Json => {
            let envelope = serde_json::json!({ "__schema": &*schema });
            serde_json::to_string_pretty(&envelope)
                .context("Failed to serialize introspection response")?
        }
        SchemaFormat::Summary => summary(&schema),
    };

    if let Some(path) = output {
        std::fs::write(&path, &content)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
        println!(
            "{} Schema written to {}",
            "✓".green(),
            path.display().to_string().cyan()
        );
        println!("  {} {:.2}s", "⏱".dimmed(), start_time.elapsed().as_secs_f64());
    } else {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(content.as_bytes())
            .context("Failed to write to stdout")?;
        if !content.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    Ok(())
}

fn summary(schema: &IntrospectionSchema) -> String {
    let mut lines = Vec::new();
    for operation in [
        OperationType::Query,
        OperationType::Mutation,
        OperationType::Subscription,
    ] {
        if let Some(root) = schema.root_type_name(operation) {
            let fields = schema
                .find_type(root)
                .map_or(0, |ty| ty.fields().len());
            lines.push(format!("{}: {root} ({fields} fields)", operation.keyword()));
        }
    }

    let count = |predicate: fn(&IntrospectionType) -> bool| {
        schema
            .types
            .iter()
            .filter(|ty| !ty.name().starts_with("__"))
            .filter(|ty| predicate(ty))
            .count()
    };
    lines.push(format!(
        "types: {} objects, {} interfaces, {} unions, {} enums, {} inputs, {} scalars",
        count(|ty| matches!(ty, IntrospectionType::Object(_))),
        count(|ty| matches!(ty, IntrospectionType::Interface(_))),
        count(|ty| matches!(ty, IntrospectionType::Union(_))),
        count(|ty| matches!(ty, IntrospectionType::Enum(_))),
        count(|ty| matches!(ty, IntrospectionType::InputObject(_))),
        count(|ty| matches!(ty, IntrospectionType::Scalar(_))),
    ));
    lines.join("\n")
}
