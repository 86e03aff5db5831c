use serde::Serialize;
use serde_json::Value;

/// A caller-supplied value for a declared argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryArgument {
    pub variable_name: String,
    /// Set when the value belongs to a directive argument.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directive_name: Option<String>,
    pub value: Value,
}

impl QueryArgument {
    #[must_use]
    pub fn new(variable_name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            variable_name: variable_name.into(),
            directive_name: None,
            value: value.into(),
        }
    }

    /// A value scoped to the arguments of one directive.
    #[must_use]
    pub fn directive(
        variable_name: impl Into<String>,
        directive_name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            variable_name: variable_name.into(),
            directive_name: Some(directive_name.into()),
            value: value.into(),
        }
    }

    /// Creates an argument from any serializable value, such as an input
    /// object struct.
    pub fn from_serialize<T: Serialize + ?Sized>(
        variable_name: impl Into<String>,
        value: &T,
    ) -> serde_json::Result<Self> {
        Ok(Self::new(variable_name, serde_json::to_value(value)?))
    }

    /// Copy of this argument with its variable renamed under `prefix`.
    #[must_use]
    pub fn prefixed(&self, prefix: &str) -> Self {
        Self {
            variable_name: format!("{prefix}{}", self.variable_name),
            ..self.clone()
        }
    }
}
