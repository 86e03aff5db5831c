use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Position of an error in the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLocation {
    pub line: u32,
    pub column: u32,
}

/// One entry of the response `errors` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<ErrorLocation>,
    /// Response path of the failing field; segments are keys or list indexes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Value>,
    /// Everything else the server attached, such as `extensions`.
    #[serde(flatten)]
    pub additional_data: Map<String, Value>,
}

impl DataError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: Vec::new(),
            additional_data: Map::new(),
        }
    }

    /// The first path segment, when it is a response key.
    #[must_use]
    pub fn root_key(&self) -> Option<&str> {
        self.path.first().and_then(Value::as_str)
    }
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(location) = self.locations.first() {
            write!(f, " at {}:{}", location.line, location.column)?;
        }
        if !self.path.is_empty() {
            let segments: Vec<String> = self
                .path
                .iter()
                .map(|segment| match segment {
                    Value::String(key) => key.clone(),
                    other => other.to_string(),
                })
                .collect();
            write!(f, " (path: {})", segments.join("."))?;
        }
        Ok(())
    }
}

/// A decoded response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphQLDataResult<T> {
    pub data: Option<T>,
    pub errors: Vec<DataError>,
    /// Top-level keys other than `data` and `errors`.
    pub additional_data: Map<String, Value>,
}

impl<T> Default for GraphQLDataResult<T> {
    fn default() -> Self {
        Self {
            data: None,
            errors: Vec::new(),
            additional_data: Map::new(),
        }
    }
}

impl<T> GraphQLDataResult<T> {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Maps the data, keeping errors and additional data.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> GraphQLDataResult<U> {
        GraphQLDataResult {
            data: self.data.map(f),
            errors: self.errors,
            additional_data: self.additional_data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_error_keeps_extra_keys() {
        let error: DataError = serde_json::from_value(json!({
            "message": "Cannot query field",
            "locations": [{"line": 1, "column": 9}],
            "path": ["hero", 0, "name"],
            "extensions": {"code": "GRAPHQL_VALIDATION_FAILED"}
        }))
        .unwrap();

        assert_eq!(error.locations, vec![ErrorLocation { line: 1, column: 9 }]);
        assert_eq!(error.root_key(), Some("hero"));
        assert_eq!(
            error.additional_data["extensions"],
            json!({"code": "GRAPHQL_VALIDATION_FAILED"})
        );
        assert_eq!(
            error.to_string(),
            "Cannot query field at 1:9 (path: hero.0.name)"
        );
    }

    #[test]
    fn test_minimal_data_error() {
        let error: DataError = serde_json::from_value(json!({"message": "boom"})).unwrap();
        assert_eq!(error, DataError::new("boom"));
        assert_eq!(serde_json::to_value(&error).unwrap(), json!({"message": "boom"}));
    }

    #[test]
    fn test_map_keeps_errors() {
        let result = GraphQLDataResult {
            data: Some(2),
            errors: vec![DataError::new("partial")],
            additional_data: Map::new(),
        };
        let mapped = result.map(|value| value * 10);
        assert_eq!(mapped.data, Some(20));
        assert!(mapped.has_errors());
    }
}
