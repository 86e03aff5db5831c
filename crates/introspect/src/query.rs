//! The introspection query and parsing of its response.

use crate::{IntrospectionError, IntrospectionResponse, IntrospectionSchema, Result};
use serde_json::Value;

/// Standard GraphQL introspection query.
///
/// Deprecated fields and enum values are included so the validator can
/// report their use. Type references nest seven levels deep, enough for
/// wrappers like `[[[String!]!]!]`.
pub const INTROSPECTION_QUERY: &str = r"
query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    subscriptionType { name }
    types {
      ...FullType
    }
    directives {
      name
      description
      locations
      args {
        ...InputValue
      }
    }
  }
}

fragment FullType on __Type {
  kind
  name
  description
  fields(includeDeprecated: true) {
    name
    description
    args {
      ...InputValue
    }
    type {
      ...TypeRef
    }
    isDeprecated
    deprecationReason
  }
  inputFields {
    ...InputValue
  }
  interfaces {
    ...TypeRef
  }
  enumValues(includeDeprecated: true) {
    name
    description
    isDeprecated
    deprecationReason
  }
  possibleTypes {
    ...TypeRef
  }
}

fragment InputValue on __InputValue {
  name
  description
  type {
    ...TypeRef
  }
  defaultValue
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType {
          kind
          name
          ofType {
            kind
            name
            ofType {
              kind
              name
              ofType {
                kind
                name
              }
            }
          }
        }
      }
    }
  }
}
";

/// Request envelope for [`INTROSPECTION_QUERY`].
#[must_use]
pub fn introspection_request() -> Value {
    serde_json::json!({ "query": INTROSPECTION_QUERY })
}

/// Parses an introspection response body into a schema snapshot.
///
/// # Errors
///
/// - [`IntrospectionError::Parse`] when the body is not a valid
///   introspection result.
/// - [`IntrospectionError::Invalid`] when the server answered with errors
///   instead of a schema.
#[tracing::instrument(skip(body), fields(body_length = body.len()))]
pub fn parse_introspection(body: &str) -> Result<IntrospectionSchema> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| IntrospectionError::Parse(e.to_string()))?;

    let has_schema = value
        .get("data")
        .and_then(|data| data.get("__schema"))
        .is_some_and(|schema| !schema.is_null());
    if !has_schema {
        let messages: Vec<&str> = value
            .get("errors")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|error| error.get("message").and_then(Value::as_str))
            .collect();
        let reason = if messages.is_empty() {
            "response has no data.__schema".to_string()
        } else {
            messages.join("; ")
        };
        tracing::error!(reason = %reason, "Introspection returned no schema");
        return Err(IntrospectionError::Invalid(reason));
    }

    let response: IntrospectionResponse = serde_json::from_value(value).map_err(|e| {
        tracing::error!(error = %e, "Failed to parse introspection response");
        IntrospectionError::Parse(e.to_string())
    })?;

    tracing::debug!(
        types = response.data.schema.types.len(),
        directives = response.data.schema.directives.len(),
        "Parsed introspection schema"
    );
    Ok(response.data.schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_introspection_query_is_valid() {
        assert!(INTROSPECTION_QUERY.contains("IntrospectionQuery"));
        assert!(INTROSPECTION_QUERY.contains("__schema"));
        assert!(INTROSPECTION_QUERY.contains("fields(includeDeprecated: true)"));
        assert_eq!(introspection_request()["query"], INTROSPECTION_QUERY);
    }

    #[test]
    fn test_parse_minimal_schema() {
        let body = r#"{"data":{"__schema":{
            "queryType":{"name":"Query"},
            "mutationType":null,
            "subscriptionType":null,
            "types":[
                {"kind":"OBJECT","name":"Query","fields":[
                    {"name":"hello","args":[],"type":{"kind":"SCALAR","name":"String","ofType":null},
                     "isDeprecated":false,"deprecationReason":null}
                ],"interfaces":null},
                {"kind":"SCALAR","name":"String","fields":null}
            ],
            "directives":[]
        }}}"#;

        let schema = parse_introspection(body).unwrap();
        assert_eq!(schema.types.len(), 2);
        let query = schema.find_type("Query").unwrap();
        assert_eq!(query.field("hello").unwrap().type_ref.to_type_string(), "String");
        assert!(schema.mutation_type.is_none());
    }

    #[test]
    fn test_errors_without_schema_are_invalid() {
        let error = parse_introspection(
            r#"{"data":null,"errors":[{"message":"Introspection is disabled"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(error, IntrospectionError::Invalid(ref m) if m == "Introspection is disabled"));
    }

    #[test]
    fn test_malformed_body() {
        assert!(matches!(
            parse_introspection("<html>"),
            Err(IntrospectionError::Parse(_))
        ));
    }
}
