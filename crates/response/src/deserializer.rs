//! Reads response envelopes against the field tree that produced the query.
//!
//! The `data` object is first normalized: every selected field is looked up
//! under its response key, missing fields become `null`, and objects of
//! polymorphic fields are read with the selection of the possible type named
//! by their `__typename`. The normalized value is then handed to serde, so a
//! polymorphic member is modeled as an enum tagged by `__typename`, wrapped in
//! [`Polymorphic`](crate::Polymorphic) when unknown types must be kept.

use crate::error::{ResponseError, Result};
use crate::result::{DataError, GraphQLDataResult};
use graphql_fields::{Field, TYPENAME_FIELD};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Parses a response body into an untyped result.
///
/// # Errors
///
/// [`ResponseError::Deserialization`] when the body is not JSON or the
/// `errors` array is malformed, [`ResponseError::InvalidEnvelope`] when the
/// body is not a JSON object.
pub fn parse_response(body: &str) -> Result<GraphQLDataResult<Value>> {
    let value: Value = serde_json::from_str(body)?;
    parse_envelope(value)
}

/// Splits a JSON envelope into data, errors and additional data.
pub fn parse_envelope(envelope: Value) -> Result<GraphQLDataResult<Value>> {
    let Value::Object(mut entries) = envelope else {
        return Err(ResponseError::InvalidEnvelope(format!(
            "expected a JSON object, found {}",
            kind_of(&envelope)
        )));
    };

    let data = entries.remove("data").filter(|data| !data.is_null());
    let errors: Vec<DataError> = match entries.remove("errors") {
        Some(Value::Null) | None => Vec::new(),
        Some(errors) => serde_json::from_value(errors)?,
    };

    Ok(GraphQLDataResult {
        data,
        errors,
        additional_data: entries,
    })
}

impl GraphQLDataResult<Value> {
    /// Reads the data as `T` using the selection it was requested with.
    ///
    /// # Errors
    ///
    /// [`ResponseError::Deserialization`] when the normalized data does not
    /// fit `T`.
    pub fn decode<T: DeserializeOwned>(self, fields: &[Field]) -> Result<GraphQLDataResult<T>> {
        let data = match self.data {
            Some(data) => Some(serde_json::from_value(normalize_data(&data, fields))?),
            None => None,
        };
        Ok(GraphQLDataResult {
            data,
            errors: self.errors,
            additional_data: self.additional_data,
        })
    }
}

/// Parses and decodes a response body in one step.
#[tracing::instrument(skip(body, fields), fields(body_length = body.len()))]
pub fn deserialize<T: DeserializeOwned>(
    body: &str,
    fields: &[Field],
) -> Result<GraphQLDataResult<T>> {
    let result = parse_response(body)?;
    tracing::debug!(errors = result.errors.len(), "Parsed response envelope");
    result.decode(fields)
}

/// Decodes an already parsed envelope.
pub fn deserialize_value<T: DeserializeOwned>(
    envelope: Value,
    fields: &[Field],
) -> Result<GraphQLDataResult<T>> {
    parse_envelope(envelope)?.decode(fields)
}

/// Rewrites `data` so its keys match the selection exactly.
#[must_use]
pub fn normalize_data(data: &Value, fields: &[Field]) -> Value {
    match data {
        Value::Object(object) => Value::Object(normalize_selection(object, fields)),
        other => other.clone(),
    }
}

fn normalize_selection(object: &Map<String, Value>, fields: &[Field]) -> Map<String, Value> {
    let mut normalized = Map::new();
    for field in fields {
        let key = field.response_key();
        let value = object
            .get(key)
            // Servers that ignore aliases answer under the wire name.
            .or_else(|| field.alias.as_ref().and_then(|_| object.get(&field.name)))
            .unwrap_or(&Value::Null);
        normalized.insert(key.to_string(), normalize_field(value, field));
    }
    normalized
}

fn normalize_field(value: &Value, field: &Field) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| normalize_field(item, field))
                .collect(),
        ),
        Value::Object(object) if !field.is_leaf() => {
            Value::Object(normalize_object(object, field))
        }
        other => other.clone(),
    }
}

fn normalize_object(object: &Map<String, Value>, field: &Field) -> Map<String, Value> {
    if !field.is_polymorphic() {
        return normalize_selection(object, &field.selection_set);
    }

    let discriminator = object.get(TYPENAME_FIELD).and_then(Value::as_str);
    let possible = discriminator.and_then(|name| field.possible_type(name));
    let mut normalized = match possible {
        Some(possible) => normalize_selection(object, &possible.selection_set),
        None => {
            tracing::debug!(
                path = %field.path,
                discriminator = discriminator.unwrap_or_default(),
                "No possible type matches discriminator, reading base selection"
            );
            normalize_selection(object, &field.selection_set)
        }
    };
    if let Some(name) = discriminator {
        normalized.insert(TYPENAME_FIELD.to_string(), Value::String(name.to_string()));
    }
    normalized
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
