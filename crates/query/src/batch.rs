//! Batch encoding: several operations merged into one document.
//!
//! Every sub-request is given a prefix `batch{index}_`. The prefix is applied
//! to the response key of each top-level field and to every variable name, so
//! the merged document can be sent in one round trip without collisions and
//! the result can be sliced back per sub-request.

use crate::argument::QueryArgument;
use crate::error::Result;
use crate::serializer::{serialize, QueryDocument};
use graphql_fields::{Field, FieldArgument, OperationType};
use serde_json::{Map, Value};

/// One sub-request of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub fields: Vec<Field>,
    pub arguments: Vec<QueryArgument>,
}

impl BatchEntry {
    #[must_use]
    pub const fn new(fields: Vec<Field>, arguments: Vec<QueryArgument>) -> Self {
        Self { fields, arguments }
    }
}

/// Response-key prefix for the sub-request at `index`.
#[must_use]
pub fn batch_prefix(index: usize) -> String {
    format!("batch{index}_")
}

/// Renders all entries as one operation.
///
/// # Errors
///
/// Fails with the first serialization error of any entry.
#[tracing::instrument(skip(entries), fields(entries = entries.len()))]
pub fn merge_batch(operation: OperationType, entries: &[BatchEntry]) -> Result<QueryDocument> {
    let mut fields = Vec::new();
    let mut arguments = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let prefix = batch_prefix(index);
        fields.extend(entry.fields.iter().map(|field| prefix_field(field, &prefix)));
        arguments.extend(entry.arguments.iter().map(|argument| argument.prefixed(&prefix)));
    }

    serialize(&fields, operation, &arguments)
}

/// Extracts one sub-request's data from the merged result, removing its
/// prefix from the top-level keys.
#[must_use]
pub fn slice_batch_data(data: &Value, prefix: &str) -> Value {
    let Value::Object(entries) = data else {
        return Value::Null;
    };
    let sliced: Map<String, Value> = entries
        .iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(prefix)
                .map(|key| (key.to_string(), value.clone()))
        })
        .collect();
    Value::Object(sliced)
}

fn prefix_field(field: &Field, prefix: &str) -> Field {
    let mut prefixed = field.clone();
    prefixed.alias = Some(format!("{prefix}{}", field.response_key()));
    prefix_variables(&mut prefixed, prefix);
    prefixed
}

fn prefix_variables(field: &mut Field, prefix: &str) {
    let rename = |argument: &mut FieldArgument| {
        argument.variable_name = format!("{prefix}{}", argument.variable_name);
    };
    field.arguments.iter_mut().for_each(rename);
    for directive in &mut field.directives {
        directive.arguments.iter_mut().for_each(rename);
    }
    for child in &mut field.selection_set {
        prefix_variables(child, prefix);
    }
    for possible in &mut field.possible_types {
        for child in &mut possible.selection_set {
            prefix_variables(child, prefix);
        }
    }
}
