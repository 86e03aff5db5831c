//! Offline validation of a selection against an introspected schema.

use crate::types::{IntrospectionInputValue, IntrospectionSchema};
use graphql_fields::{Field, FieldArgument, OperationType, TYPENAME_FIELD};
use thiserror::Error;

/// A mismatch between a selection and the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field_name}' does not exist on type '{type_name}' (at '{path}')")]
    FieldNotFound {
        path: String,
        type_name: String,
        field_name: String,
    },

    #[error("Field '{field_name}' is deprecated{} (at '{path}')", deprecation_suffix(.reason))]
    FieldDeprecated {
        path: String,
        field_name: String,
        reason: Option<String>,
    },

    #[error("Argument '{argument_name}' does not exist on field '{field_name}' (at '{path}')")]
    ArgumentNotFound {
        path: String,
        field_name: String,
        argument_name: String,
    },

    #[error("Argument '{argument_name}' has type '{actual}' but the schema declares '{expected}' (at '{path}')")]
    ArgumentInvalidType {
        path: String,
        argument_name: String,
        expected: String,
        actual: String,
    },

    #[error("Type '{possible_type}' is not a possible type of '{type_name}' (at '{path}')")]
    PossibleTypeNotFound {
        path: String,
        type_name: String,
        possible_type: String,
    },
}

fn deprecation_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|reason| format!(": {reason}"))
        .unwrap_or_default()
}

impl ValidationError {
    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::FieldNotFound { .. } => "FIELD_NOT_FOUND",
            Self::FieldDeprecated { .. } => "FIELD_DEPRECATED",
            Self::ArgumentNotFound { .. } => "ARGUMENT_NOT_FOUND",
            Self::ArgumentInvalidType { .. } => "ARGUMENT_INVALID_TYPE",
            Self::PossibleTypeNotFound { .. } => "POSSIBLE_TYPE_NOT_FOUND",
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::FieldNotFound { path, .. }
            | Self::FieldDeprecated { path, .. }
            | Self::ArgumentNotFound { path, .. }
            | Self::ArgumentInvalidType { path, .. }
            | Self::PossibleTypeNotFound { path, .. } => path,
        }
    }

    /// Deprecation is informational; everything else makes the query fail.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::FieldDeprecated { .. })
    }
}

/// Checks `fields` against `schema`, starting at the root type of
/// `operation`, and returns every violation found.
#[must_use]
#[tracing::instrument(skip(fields, schema), fields(fields = fields.len()))]
pub fn validate(
    fields: &[Field],
    schema: &IntrospectionSchema,
    operation: OperationType,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let root = schema
        .root_type_name(operation)
        .map_or_else(|| default_root_name(operation).to_string(), str::to_string);
    Validator { schema }.selection(fields, &root, &mut errors);

    tracing::debug!(errors = errors.len(), "Validated selection");
    errors
}

const fn default_root_name(operation: OperationType) -> &'static str {
    match operation {
        OperationType::Query => "Query",
        OperationType::Mutation => "Mutation",
        OperationType::Subscription => "Subscription",
    }
}

struct Validator<'a> {
    schema: &'a IntrospectionSchema,
}

impl Validator<'_> {
    fn selection(&self, fields: &[Field], type_name: &str, errors: &mut Vec<ValidationError>) {
        for field in fields {
            if field.name != TYPENAME_FIELD {
                self.field(field, type_name, errors);
            }
        }
    }

    fn field(&self, field: &Field, type_name: &str, errors: &mut Vec<ValidationError>) {
        let Some(definition) = self
            .schema
            .find_type(type_name)
            .and_then(|ty| ty.field(&field.name))
        else {
            errors.push(ValidationError::FieldNotFound {
                path: field.path.clone(),
                type_name: type_name.to_string(),
                field_name: field.name.clone(),
            });
            return;
        };

        if definition.is_deprecated {
            errors.push(ValidationError::FieldDeprecated {
                path: field.path.clone(),
                field_name: field.name.clone(),
                reason: definition.deprecation_reason.clone(),
            });
        }

        for argument in &field.arguments {
            check_argument(field, argument, definition.argument(&argument.argument_name), errors);
        }

        let Some(child_type) = definition.type_ref.named_type() else {
            return;
        };
        self.selection(&field.selection_set, child_type, errors);

        if field.possible_types.is_empty() {
            return;
        }
        let possible_names = self.schema.possible_type_names(child_type);
        for possible in &field.possible_types {
            // The discriminator is what the server reports in __typename, so
            // it has to name a possible type as well.
            let mut names = vec![possible.type_name.as_str()];
            if possible.discriminator != possible.type_name {
                names.push(possible.discriminator.as_str());
            }
            let unknown: Vec<_> = names
                .into_iter()
                .filter(|name| !possible_names.contains(name))
                .collect();

            if unknown.is_empty() {
                self.selection(&possible.selection_set, &possible.type_name, errors);
            }
            for name in unknown {
                errors.push(ValidationError::PossibleTypeNotFound {
                    path: field.path.clone(),
                    type_name: child_type.to_string(),
                    possible_type: name.to_string(),
                });
            }
        }
    }
}

fn check_argument(
    field: &Field,
    argument: &FieldArgument,
    definition: Option<&IntrospectionInputValue>,
    errors: &mut Vec<ValidationError>,
) {
    let Some(definition) = definition else {
        errors.push(ValidationError::ArgumentNotFound {
            path: field.path.clone(),
            field_name: field.name.clone(),
            argument_name: argument.argument_name.clone(),
        });
        return;
    };

    let expected = definition.type_ref.to_type_string();
    if expected != argument.argument_type {
        errors.push(ValidationError::ArgumentInvalidType {
            path: field.path.clone(),
            argument_name: argument.argument_name.clone(),
            expected,
            actual: argument.argument_type.clone(),
        });
    }
}
