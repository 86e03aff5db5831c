//! The selection-set field model.
//!
//! A [`Field`] tree is the in-memory form of a GraphQL selection set plus the
//! metadata needed to serialize it into query text and to read a response
//! back. Trees are immutable once built and can be shared between requests.

use serde::Serialize;
use serde_json::Value;

/// Name of the discriminator field selected for polymorphic results.
pub const TYPENAME_FIELD: &str = "__typename";

/// A GraphQL operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    #[default]
    Query,
    Mutation,
    Subscription,
}

impl OperationType {
    /// The keyword used in query text.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A single field in a selection set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// Wire field name.
    pub name: String,
    /// Response key, set when it differs from the wire name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Dot-joined chain of response keys from the root. Unique per tree.
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_path: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub selection_set: Vec<Field>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<FieldArgument>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<FieldDirective>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub possible_types: Vec<PossibleTypeSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_type: Option<BaseType>,
}

impl Field {
    /// Creates a leaf field at the given position in the tree.
    #[must_use]
    pub fn leaf(name: impl Into<String>, parent_path: Option<&str>) -> Self {
        let name = name.into();
        Self {
            path: join_path(parent_path, &name),
            parent_path: parent_path.map(str::to_string),
            name,
            alias: None,
            selection_set: Vec::new(),
            arguments: Vec::new(),
            directives: Vec::new(),
            possible_types: Vec::new(),
            base_type: None,
        }
    }

    /// The key under which this field appears in a response object.
    #[must_use]
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.selection_set.is_empty() && self.possible_types.is_empty()
    }

    /// True when the response object for this field must be dispatched by
    /// its `__typename`.
    #[must_use]
    pub fn is_polymorphic(&self) -> bool {
        !self.possible_types.is_empty()
    }

    /// Looks up the concrete selection for a discriminator value.
    #[must_use]
    pub fn possible_type(&self, discriminator: &str) -> Option<&PossibleTypeSelection> {
        self.possible_types
            .iter()
            .find(|possible| possible.discriminator == discriminator)
    }

    /// Visits this field and every descendant, including the selections of
    /// possible types, in depth-first order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Field)) {
        visit(self);
        for child in &self.selection_set {
            child.walk(visit);
        }
        for possible in &self.possible_types {
            for child in &possible.selection_set {
                child.walk(visit);
            }
        }
    }
}

/// Visits every field of a forest in depth-first order.
pub fn walk_fields<'a>(fields: &'a [Field], visit: &mut impl FnMut(&'a Field)) {
    for field in fields {
        field.walk(visit);
    }
}

/// Joins a parent path and a response key.
#[must_use]
pub fn join_path(parent_path: Option<&str>, key: &str) -> String {
    match parent_path {
        Some(parent) => format!("{parent}.{key}"),
        None => key.to_string(),
    }
}

/// The declared result shape of a non-leaf field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseType {
    pub name: String,
    pub is_abstract: bool,
}

/// Concrete selection recorded for one discriminator value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PossibleTypeSelection {
    /// The `__typename` value that selects this entry.
    pub discriminator: String,
    /// GraphQL name of the concrete type.
    pub type_name: String,
    pub selection_set: Vec<Field>,
}

/// An argument declared on a field or directive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldArgument {
    pub argument_name: String,
    /// GraphQL type, e.g. `Int!`.
    pub argument_type: String,
    /// Name the caller binds a value to.
    pub variable_name: String,
    pub is_required: bool,
    /// Render the value as a literal instead of a `$variable`.
    pub inline_argument: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl FieldArgument {
    #[must_use]
    pub fn new(
        argument_name: impl Into<String>,
        argument_type: impl Into<String>,
        variable_name: impl Into<String>,
    ) -> Self {
        Self {
            argument_name: argument_name.into(),
            argument_type: argument_type.into(),
            variable_name: variable_name.into(),
            is_required: false,
            inline_argument: false,
            default_value: None,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    #[must_use]
    pub fn inline(mut self) -> Self {
        self.inline_argument = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// A directive applied to a field, e.g. `@include(if: $show)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDirective {
    pub directive_name: String,
    pub arguments: Vec<FieldArgument>,
}

impl FieldDirective {
    #[must_use]
    pub fn new(directive_name: impl Into<String>) -> Self {
        Self {
            directive_name: directive_name.into(),
            arguments: Vec::new(),
        }
    }

    #[must_use]
    pub fn argument(mut self, argument: FieldArgument) -> Self {
        self.arguments.push(argument);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_paths() {
        let root = Field::leaf("hero", None);
        assert_eq!(root.path, "hero");
        assert_eq!(root.parent_path, None);

        let child = Field::leaf("name", Some("hero"));
        assert_eq!(child.path, "hero.name");
        assert_eq!(child.parent_path.as_deref(), Some("hero"));
    }

    #[test]
    fn test_response_key_prefers_alias() {
        let mut field = Field::leaf("hello", None);
        assert_eq!(field.response_key(), "hello");
        field.alias = Some("Hello1".to_string());
        assert_eq!(field.response_key(), "Hello1");
    }

    #[test]
    fn test_argument_builder() {
        let argument = FieldArgument::new("first", "Int!", "count")
            .required()
            .default_value(10);
        assert!(argument.is_required);
        assert!(!argument.inline_argument);
        assert_eq!(argument.default_value, Some(Value::from(10)));
    }

    #[test]
    fn test_operation_keyword() {
        assert_eq!(OperationType::Query.to_string(), "query");
        assert_eq!(OperationType::Mutation.keyword(), "mutation");
        assert_eq!(OperationType::Subscription.keyword(), "subscription");
    }
}
