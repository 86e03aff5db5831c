//! Imperative selection sets for queries without a static shape.

use crate::field::{join_path, Field, FieldArgument, FieldDirective};

/// A field in an ad hoc selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicField {
    name: String,
    alias: Option<String>,
    arguments: Vec<FieldArgument>,
    directives: Vec<FieldDirective>,
    children: Vec<DynamicField>,
}

impl DynamicField {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            arguments: Vec::new(),
            directives: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    #[must_use]
    pub fn argument(mut self, argument: FieldArgument) -> Self {
        self.arguments.push(argument);
        self
    }

    #[must_use]
    pub fn directive(mut self, directive: FieldDirective) -> Self {
        self.directives.push(directive);
        self
    }

    #[must_use]
    pub fn select(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    fn child_mut(&mut self, name: &str) -> &mut Self {
        let index = match self.children.iter().position(|c| c.response_key() == name) {
            Some(index) => index,
            None => {
                self.children.push(Self::new(name));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    fn into_field(self, parent_path: Option<&str>) -> Field {
        let mut field = Field::leaf(self.name, parent_path);
        if let Some(alias) = self.alias {
            field.path = join_path(parent_path, &alias);
            field.alias = Some(alias);
        }
        field.arguments = self.arguments;
        field.directives = self.directives;
        let path = field.path.clone();
        field.selection_set = self
            .children
            .into_iter()
            .map(|child| child.into_field(Some(&path)))
            .collect();
        field
    }
}

/// Builds a selection set field by field.
///
/// ```
/// use graphql_fields::{DynamicField, SelectionBuilder};
///
/// let fields = SelectionBuilder::from_paths(["hero.name", "hero.friends.name"])
///     .select(DynamicField::new("version"))
///     .build();
///
/// assert_eq!(fields[0].selection_set[1].path, "hero.friends");
/// assert_eq!(fields[1].path, "version");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionBuilder {
    roots: Vec<DynamicField>,
}

impl SelectionBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds nested fields from dotted paths, merging shared prefixes.
    #[must_use]
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root = DynamicField::new("");
        for path in paths {
            let mut node = &mut root;
            for segment in path.as_ref().split('.').filter(|s| !s.is_empty()) {
                node = node.child_mut(segment);
            }
        }
        Self {
            roots: root.children,
        }
    }

    #[must_use]
    pub fn select(mut self, field: DynamicField) -> Self {
        self.roots.push(field);
        self
    }

    #[must_use]
    pub fn build(self) -> Vec<Field> {
        self.roots
            .into_iter()
            .map(|field| field.into_field(None))
            .collect()
    }
}
