//! Untyped results for selections built at runtime.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::{Deref, Index};

/// Response data without a static shape.
///
/// ```
/// use graphql_response::DynamicResult;
/// use serde_json::json;
///
/// let result = DynamicResult::new(json!({"hero": {"friends": [{"name": "Han"}]}}));
/// assert_eq!(result["hero"]["friends"][0]["name"], "Han");
/// assert_eq!(result.get_path("hero.friends.0.name"), Some(&json!("Han")));
/// assert_eq!(result.get_path("hero.age"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicResult(Value);

impl DynamicResult {
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Looks up a dotted path; numeric segments index into lists.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(&self.0, |value, segment| match value {
                Value::Object(entries) => entries.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }

    #[must_use]
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl Deref for DynamicResult {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.0
    }
}

impl Index<&str> for DynamicResult {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        &self.0[key]
    }
}

impl From<Value> for DynamicResult {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_keys_index_to_null() {
        let result = DynamicResult::new(json!({"hero": {"name": "Luke"}}));
        assert_eq!(result["hero"]["name"], json!("Luke"));
        assert!(result["villain"].is_null());
        assert!(result["hero"]["age"].is_null());
    }

    #[test]
    fn test_get_path() {
        let result = DynamicResult::new(json!({"a": [{"b": 1}, {"b": 2}]}));
        assert_eq!(result.get_path("a.1.b"), Some(&json!(2)));
        assert_eq!(result.get_path("a.x"), None);
        assert_eq!(result.get_path("a.5.b"), None);
        assert_eq!(result.get_path(""), Some(&json!({"a": [{"b": 1}, {"b": 2}]})));
    }

    #[test]
    fn test_transparent_serde() {
        let result: DynamicResult = serde_json::from_str(r#"{"x":1}"#).unwrap();
        assert_eq!(result.get("x"), Some(&json!(1)));
        assert_eq!(serde_json::to_string(&result).unwrap(), r#"{"x":1}"#);
    }
}
