//! Renders field trees into GraphQL query text.
//!
//! The output is compact: `query($id:ID!){hero(id:$id){name friends{name}}}`.
//! Fields render in tree order, arguments bound inline appear as literals and
//! all others as `$variables` declared in the operation signature.

use crate::argument::QueryArgument;
use crate::error::{QueryError, Result};
use graphql_fields::{walk_fields, Field, FieldArgument, OperationType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Query text plus variables, serialized as the request envelope
/// `{"query": ..., "variables": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryDocument {
    pub query: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub variables: Map<String, Value>,
}

impl QueryDocument {
    /// The JSON request envelope.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut envelope = Map::new();
        envelope.insert("query".to_string(), Value::String(self.query.clone()));
        if !self.variables.is_empty() {
            envelope.insert(
                "variables".to_string(),
                Value::Object(self.variables.clone()),
            );
        }
        Value::Object(envelope)
    }
}

/// Renders `fields` as a complete operation.
///
/// # Errors
///
/// - [`QueryError::UnknownArgument`] when a supplied argument matches no
///   declared field or directive argument.
/// - [`QueryError::MissingRequiredArgument`] when a required argument has
///   neither a supplied value nor a default.
#[tracing::instrument(skip(fields, arguments), fields(fields = fields.len(), arguments = arguments.len()))]
pub fn serialize(
    fields: &[Field],
    operation: OperationType,
    arguments: &[QueryArgument],
) -> Result<QueryDocument> {
    check_arguments(fields, arguments)?;

    let mut writer = QueryWriter {
        arguments,
        variables: Vec::new(),
    };
    let mut body = String::new();
    writer.selection_set(fields, &mut body)?;

    let mut query = String::from(operation.keyword());
    if !writer.variables.is_empty() {
        let definitions: Vec<String> = writer
            .variables
            .iter()
            .map(|variable| format!("${}:{}", variable.name, variable.graphql_type))
            .collect();
        query.push('(');
        query.push_str(&definitions.join(","));
        query.push(')');
    }
    query.push('{');
    query.push_str(&body);
    query.push('}');

    let variables = writer
        .variables
        .into_iter()
        .map(|variable| (variable.name, variable.value))
        .collect();

    tracing::debug!(query = %query, "Generated query");
    Ok(QueryDocument { query, variables })
}

/// Verifies every supplied argument binds to something declared in the tree.
pub fn check_arguments(fields: &[Field], arguments: &[QueryArgument]) -> Result<()> {
    let mut declared: Vec<(Option<&str>, &str)> = Vec::new();
    walk_fields(fields, &mut |field| {
        for argument in &field.arguments {
            declared.push((None, &argument.variable_name));
        }
        for directive in &field.directives {
            for argument in &directive.arguments {
                declared.push((Some(&directive.directive_name), &argument.variable_name));
            }
        }
    });

    for argument in arguments {
        let known = declared.iter().any(|(directive, variable)| {
            *variable == argument.variable_name
                && argument
                    .directive_name
                    .as_deref()
                    .is_none_or(|name| *directive == Some(name))
        });
        if !known {
            return Err(QueryError::UnknownArgument {
                variable_name: argument.variable_name.clone(),
            });
        }
    }
    Ok(())
}

/// Renders a JSON value as a GraphQL input literal.
#[must_use]
pub fn render_literal(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(render_literal).collect();
            format!("[{}]", items.join(","))
        }
        Value::Object(entries) => {
            let entries: Vec<String> = entries
                .iter()
                .map(|(key, value)| format!("{key}:{}", render_literal(value)))
                .collect();
            format!("{{{}}}", entries.join(","))
        }
        // JSON scalars and strings are valid GraphQL literals as written.
        scalar => scalar.to_string(),
    }
}

struct VariableDefinition {
    name: String,
    graphql_type: String,
    value: Value,
}

struct QueryWriter<'a> {
    arguments: &'a [QueryArgument],
    variables: Vec<VariableDefinition>,
}

impl QueryWriter<'_> {
    fn selection_set(&mut self, fields: &[Field], out: &mut String) -> Result<()> {
        for (index, field) in fields.iter().enumerate() {
            if index > 0 {
                out.push(' ');
            }
            self.field(field, out)?;
        }
        Ok(())
    }

    fn field(&mut self, field: &Field, out: &mut String) -> Result<()> {
        if let Some(alias) = &field.alias {
            out.push_str(alias);
            out.push(':');
        }
        out.push_str(&field.name);

        let arguments = self.arguments(&field.arguments, None, &field.path)?;
        if !arguments.is_empty() {
            out.push('(');
            out.push_str(&arguments.join(","));
            out.push(')');
        }

        for directive in &field.directives {
            let arguments =
                self.arguments(&directive.arguments, Some(&directive.directive_name), &field.path)?;
            // A directive whose arguments were all left unbound is not applied.
            if !directive.arguments.is_empty() && arguments.is_empty() {
                continue;
            }
            out.push('@');
            out.push_str(&directive.directive_name);
            if !arguments.is_empty() {
                out.push('(');
                out.push_str(&arguments.join(","));
                out.push(')');
            }
        }

        if !field.is_leaf() {
            out.push('{');
            self.selection_set(&field.selection_set, out)?;
            for possible in &field.possible_types {
                if possible.selection_set.is_empty() {
                    continue;
                }
                out.push_str(" ... on ");
                out.push_str(&possible.type_name);
                out.push('{');
                self.selection_set(&possible.selection_set, out)?;
                out.push('}');
            }
            out.push('}');
        }
        Ok(())
    }

    fn arguments(
        &mut self,
        declared: &[FieldArgument],
        directive: Option<&str>,
        path: &str,
    ) -> Result<Vec<String>> {
        let mut rendered = Vec::new();
        for argument in declared {
            let value = self
                .lookup(argument, directive)
                .or(argument.default_value.as_ref())
                .cloned();

            let Some(value) = value else {
                if argument.is_required {
                    return Err(QueryError::MissingRequiredArgument {
                        argument_name: argument.argument_name.clone(),
                        variable_name: argument.variable_name.clone(),
                        path: path.to_string(),
                    });
                }
                continue;
            };

            if argument.inline_argument {
                rendered.push(format!(
                    "{}:{}",
                    argument.argument_name,
                    render_literal(&value)
                ));
            } else {
                self.define_variable(argument, value);
                rendered.push(format!(
                    "{}:${}",
                    argument.argument_name, argument.variable_name
                ));
            }
        }
        Ok(rendered)
    }

    fn lookup(&self, argument: &FieldArgument, directive: Option<&str>) -> Option<&Value> {
        let matches = |supplied: &&QueryArgument, scope: Option<&str>| {
            supplied.variable_name == argument.variable_name
                && supplied.directive_name.as_deref() == scope
        };
        self.arguments
            .iter()
            .find(|supplied| matches(supplied, directive))
            .or_else(|| {
                directive.and_then(|_| self.arguments.iter().find(|supplied| matches(supplied, None)))
            })
            .map(|supplied| &supplied.value)
    }

    fn define_variable(&mut self, argument: &FieldArgument, value: Value) {
        if self
            .variables
            .iter()
            .any(|variable| variable.name == argument.variable_name)
        {
            return;
        }
        self.variables.push(VariableDefinition {
            name: argument.variable_name.clone(),
            graphql_type: argument.argument_type.clone(),
            value,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_fields::{BaseType, FieldDirective, PossibleTypeSelection, TYPENAME_FIELD};
    use serde_json::json;

    fn leaf(name: &str) -> Field {
        Field::leaf(name, None)
    }

    fn object(name: &str, children: Vec<Field>) -> Field {
        let mut field = Field::leaf(name, None);
        field.selection_set = children;
        field.base_type = Some(BaseType {
            name: name.to_string(),
            is_abstract: false,
        });
        field
    }

    #[test]
    fn test_simple_query() {
        let document = serialize(&[leaf("A"), leaf("B")], OperationType::Query, &[]).unwrap();
        insta::assert_snapshot!(document.query, @"query{A B}");
        assert!(document.variables.is_empty());
        assert_eq!(document.to_json(), json!({"query": "query{A B}"}));
    }

    #[test]
    fn test_nested_selection_and_alias() {
        let mut first = leaf("hello");
        first.alias = Some("Hello1".to_string());
        let mut second = leaf("hello");
        second.alias = Some("Hello2".to_string());
        let fields = vec![first, second, object("hero", vec![leaf("name")])];

        let document = serialize(&fields, OperationType::Query, &[]).unwrap();
        insta::assert_snapshot!(document.query, @"query{Hello1:hello Hello2:hello hero{name}}");
    }

    #[test]
    fn test_variable_argument() {
        let mut hero = object("hero", vec![leaf("name")]);
        hero.arguments
            .push(FieldArgument::new("episode", "Episode!", "heroEpisode").required());

        let document = serialize(
            &[hero],
            OperationType::Query,
            &[QueryArgument::new("heroEpisode", "JEDI")],
        )
        .unwrap();
        insta::assert_snapshot!(document.query, @"query($heroEpisode:Episode!){hero(episode:$heroEpisode){name}}");
        assert_eq!(document.variables.get("heroEpisode"), Some(&json!("JEDI")));
        assert_eq!(
            document.to_json(),
            json!({
                "query": "query($heroEpisode:Episode!){hero(episode:$heroEpisode){name}}",
                "variables": {"heroEpisode": "JEDI"}
            })
        );
    }

    #[test]
    fn test_inline_argument_literal() {
        let mut search = object("search", vec![leaf("id")]);
        search
            .arguments
            .push(FieldArgument::new("filter", "SearchFilter", "filter").inline());

        let document = serialize(
            &[search],
            OperationType::Query,
            &[QueryArgument::new(
                "filter",
                json!({"text": "luke \"sky\"", "limit": 5, "tags": ["a", "b"]}),
            )],
        )
        .unwrap();
        insta::assert_snapshot!(document.query, @r#"query{search(filter:{limit:5,tags:["a","b"],text:"luke \"sky\""}){id}}"#);
        assert!(document.variables.is_empty());
    }

    #[test]
    fn test_default_value_used_when_unbound() {
        let mut users = object("users", vec![leaf("id")]);
        users
            .arguments
            .push(FieldArgument::new("first", "Int!", "first").required().default_value(10));

        let document = serialize(&[users], OperationType::Query, &[]).unwrap();
        insta::assert_snapshot!(document.query, @"query($first:Int!){users(first:$first){id}}");
        assert_eq!(document.variables.get("first"), Some(&json!(10)));
    }

    #[test]
    fn test_optional_argument_omitted() {
        let mut users = object("users", vec![leaf("id")]);
        users.arguments.push(FieldArgument::new("after", "String", "cursor"));

        let document = serialize(&[users], OperationType::Query, &[]).unwrap();
        insta::assert_snapshot!(document.query, @"query{users{id}}");
    }

    #[test]
    fn test_missing_required_argument() {
        let mut hello = leaf("hello");
        hello
            .arguments
            .push(FieldArgument::new("name", "String!", "helloName").required());

        let error = serialize(&[hello], OperationType::Query, &[]).unwrap_err();
        assert_eq!(
            error,
            QueryError::MissingRequiredArgument {
                argument_name: "name".to_string(),
                variable_name: "helloName".to_string(),
                path: "hello".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_argument() {
        let error = serialize(
            &[leaf("hello")],
            OperationType::Query,
            &[QueryArgument::new("nope", 1)],
        )
        .unwrap_err();
        assert_eq!(
            error,
            QueryError::UnknownArgument {
                variable_name: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_directive_rendering() {
        let mut hello = leaf("hello");
        hello.directives.push(
            FieldDirective::new("include").argument(FieldArgument::new("if", "Boolean!", "show")),
        );

        let unbound = serialize(&[hello.clone()], OperationType::Query, &[]).unwrap();
        insta::assert_snapshot!(unbound.query, @"query{hello}");

        let bound = serialize(
            &[hello.clone()],
            OperationType::Query,
            &[QueryArgument::directive("show", "include", true)],
        )
        .unwrap();
        insta::assert_snapshot!(bound.query, @"query($show:Boolean!){hello@include(if:$show)}");

        let wrong_scope = serialize(
            &[hello],
            OperationType::Query,
            &[QueryArgument::directive("show", "skip", true)],
        );
        assert!(matches!(wrong_scope, Err(QueryError::UnknownArgument { .. })));
    }

    #[test]
    fn test_possible_types_render_inline_fragments() {
        let mut pet = object("pet", vec![leaf(TYPENAME_FIELD), leaf("name")]);
        pet.possible_types.push(PossibleTypeSelection {
            discriminator: "Cat".to_string(),
            type_name: "Cat".to_string(),
            selection_set: vec![leaf("name"), leaf("meows")],
        });
        pet.possible_types.push(PossibleTypeSelection {
            discriminator: "Dog".to_string(),
            type_name: "Dog".to_string(),
            selection_set: vec![leaf("barks")],
        });

        let document = serialize(&[pet], OperationType::Query, &[]).unwrap();
        insta::assert_snapshot!(document.query, @"query{pet{__typename name ... on Cat{name meows} ... on Dog{barks}}}");
    }

    #[test]
    fn test_operation_keywords() {
        let mutation = serialize(&[leaf("a")], OperationType::Mutation, &[]).unwrap();
        assert_eq!(mutation.query, "mutation{a}");
        let subscription = serialize(&[leaf("a")], OperationType::Subscription, &[]).unwrap();
        assert_eq!(subscription.query, "subscription{a}");
    }

    #[test]
    fn test_render_literal_scalars() {
        assert_eq!(render_literal(&json!(null)), "null");
        assert_eq!(render_literal(&json!(true)), "true");
        assert_eq!(render_literal(&json!(1.5)), "1.5");
        assert_eq!(render_literal(&json!("a\nb")), "\"a\\nb\"");
    }
}
