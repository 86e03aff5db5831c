//! Type definitions for GraphQL introspection responses.
//!
//! These types mirror the structure of the `__schema` introspection result
//! and can be deserialized from JSON using serde. Lists that some servers
//! report as `null` default to empty.

use graphql_fields::OperationType;
use serde::{Deserialize, Deserializer, Serialize};

fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Top-level introspection response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionResponse {
    pub data: IntrospectionData,
}

/// Data field of the introspection response containing the schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionData {
    #[serde(rename = "__schema")]
    pub schema: IntrospectionSchema,
}

/// A schema snapshot as reported by introspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionSchema {
    pub query_type: Option<IntrospectionTypeRef>,
    pub mutation_type: Option<IntrospectionTypeRef>,
    pub subscription_type: Option<IntrospectionTypeRef>,
    pub types: Vec<IntrospectionType>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub directives: Vec<IntrospectionDirective>,
}

impl IntrospectionSchema {
    #[must_use]
    pub fn find_type(&self, name: &str) -> Option<&IntrospectionType> {
        self.types.iter().find(|ty| ty.name() == name)
    }

    /// Name of the root type for an operation, if the schema supports it.
    #[must_use]
    pub fn root_type_name(&self, operation: OperationType) -> Option<&str> {
        let root = match operation {
            OperationType::Query => self.query_type.as_ref(),
            OperationType::Mutation => self.mutation_type.as_ref(),
            OperationType::Subscription => self.subscription_type.as_ref(),
        };
        root.map(|root| root.name.as_str())
    }

    /// Concrete types a value of `type_name` may have at runtime.
    ///
    /// An object type is its only possible type.
    #[must_use]
    pub fn possible_type_names(&self, type_name: &str) -> Vec<&str> {
        match self.find_type(type_name) {
            Some(IntrospectionType::Union(union)) => union
                .possible_types
                .iter()
                .map(|ty| ty.name.as_str())
                .collect(),
            Some(IntrospectionType::Interface(interface)) => interface
                .possible_types
                .iter()
                .flatten()
                .map(|ty| ty.name.as_str())
                .collect(),
            Some(IntrospectionType::Object(object)) => vec![object.name.as_str()],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionTypeRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum IntrospectionType {
    #[serde(rename = "SCALAR")]
    Scalar(IntrospectionScalarType),
    #[serde(rename = "OBJECT")]
    Object(IntrospectionObjectType),
    #[serde(rename = "INTERFACE")]
    Interface(IntrospectionInterfaceType),
    #[serde(rename = "UNION")]
    Union(IntrospectionUnionType),
    #[serde(rename = "ENUM")]
    Enum(IntrospectionEnumType),
    #[serde(rename = "INPUT_OBJECT")]
    InputObject(IntrospectionInputObjectType),
}

impl IntrospectionType {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(ty) => &ty.name,
            Self::Object(ty) => &ty.name,
            Self::Interface(ty) => &ty.name,
            Self::Union(ty) => &ty.name,
            Self::Enum(ty) => &ty.name,
            Self::InputObject(ty) => &ty.name,
        }
    }

    /// Selectable fields; empty for types that have none.
    #[must_use]
    pub fn fields(&self) -> &[IntrospectionField] {
        match self {
            Self::Object(ty) => &ty.fields,
            Self::Interface(ty) => &ty.fields,
            _ => &[],
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&IntrospectionField> {
        self.fields().iter().find(|field| field.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionScalarType {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionObjectType {
    pub name: String,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub fields: Vec<IntrospectionField>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub interfaces: Vec<IntrospectionTypeRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionInterfaceType {
    pub name: String,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub fields: Vec<IntrospectionField>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub interfaces: Vec<IntrospectionTypeRef>,
    pub possible_types: Option<Vec<IntrospectionTypeRef>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionUnionType {
    pub name: String,
    pub description: Option<String>,
    pub possible_types: Vec<IntrospectionTypeRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionEnumType {
    pub name: String,
    pub description: Option<String>,
    pub enum_values: Vec<IntrospectionEnumValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionInputObjectType {
    pub name: String,
    pub description: Option<String>,
    pub input_fields: Vec<IntrospectionInputValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionField {
    pub name: String,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub args: Vec<IntrospectionInputValue>,
    #[serde(rename = "type")]
    pub type_ref: IntrospectionTypeRefFull,
    #[serde(default)]
    pub is_deprecated: bool,
    pub deprecation_reason: Option<String>,
}

impl IntrospectionField {
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&IntrospectionInputValue> {
        self.args.iter().find(|arg| arg.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionInputValue {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub type_ref: IntrospectionTypeRefFull,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionEnumValue {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_deprecated: bool,
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionDirective {
    pub name: String,
    pub description: Option<String>,
    pub locations: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub args: Vec<IntrospectionInputValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionTypeRefFull {
    pub kind: TypeKind,
    pub name: Option<String>,
    pub of_type: Option<Box<IntrospectionTypeRefFull>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

impl IntrospectionTypeRefFull {
    /// Converts the type reference to a GraphQL type string.
    ///
    /// Handles type wrappers like `NonNull` and `List` to generate strings like:
    /// - `String` for a simple scalar
    /// - `String!` for a non-null scalar
    /// - `[String!]!` for a non-null list of non-null strings
    ///
    /// ```
    /// # use graphql_introspect::{IntrospectionTypeRefFull, TypeKind};
    /// let type_ref = IntrospectionTypeRefFull {
    ///     kind: TypeKind::NonNull,
    ///     name: None,
    ///     of_type: Some(Box::new(IntrospectionTypeRefFull {
    ///         kind: TypeKind::Scalar,
    ///         name: Some("String".to_string()),
    ///         of_type: None,
    ///     })),
    /// };
    /// assert_eq!(type_ref.to_type_string(), "String!");
    /// assert_eq!(type_ref.named_type(), Some("String"));
    /// ```
    #[must_use]
    pub fn to_type_string(&self) -> String {
        match self.kind {
            TypeKind::NonNull => self.of_type.as_ref().map_or_else(
                || "!".to_string(),
                |of_type| format!("{}!", of_type.to_type_string()),
            ),
            TypeKind::List => self.of_type.as_ref().map_or_else(
                || "[]".to_string(),
                |of_type| format!("[{}]", of_type.to_type_string()),
            ),
            _ => self.name.as_deref().unwrap_or_default().to_string(),
        }
    }

    /// The named type under all list and non-null wrappers.
    #[must_use]
    pub fn named_type(&self) -> Option<&str> {
        match self.kind {
            TypeKind::NonNull | TypeKind::List => {
                self.of_type.as_deref().and_then(Self::named_type)
            }
            _ => self.name.as_deref(),
        }
    }
}

impl std::fmt::Display for IntrospectionTypeRefFull {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_type_string())
    }
}
