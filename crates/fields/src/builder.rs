//! Builds [`Field`] trees from type descriptors.

use crate::descriptor::{GraphQLObject, Member, ObjectDescriptor, PossibleType, TypeRef};
use crate::error::{BuildError, Result};
use crate::field::{join_path, BaseType, Field, PossibleTypeSelection, TYPENAME_FIELD};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Produces the selection set for a [`GraphQLObject`].
///
/// Building is pure: the result depends only on the static descriptors, so
/// repeated builds of the same type yield identical trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldBuilder;

impl FieldBuilder {
    /// Builds the root selection set for `T`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::CircularReference`] when a type selects into
    /// itself without a max depth on the recursive member.
    pub fn build<T: GraphQLObject>() -> Result<Vec<Field>> {
        Self::build_type(TypeRef::of::<T>())
    }

    #[tracing::instrument(skip_all, fields(type_id = type_ref.id()))]
    pub fn build_type(type_ref: TypeRef) -> Result<Vec<Field>> {
        let mut context = BuildContext::default();
        let fields = context.selection_set(type_ref, None)?;
        tracing::debug!(fields = fields.len(), "Built selection set");
        Ok(fields)
    }
}

#[derive(Default)]
struct BuildContext {
    /// Types currently being expanded, outermost first.
    stack: Vec<&'static str>,
    /// Remaining expansions for types reached through a bounded member.
    budgets: HashMap<&'static str, u32>,
}

impl BuildContext {
    fn selection_set(&mut self, type_ref: TypeRef, parent_path: Option<&str>) -> Result<Vec<Field>> {
        let descriptor = type_ref.describe();

        if !self.budgets.contains_key(type_ref.id()) && self.stack.contains(&type_ref.id()) {
            return Err(BuildError::CircularReference {
                type_name: descriptor.name,
                path: parent_path.unwrap_or_default().to_string(),
            });
        }

        self.stack.push(type_ref.id());
        let result = self.members(&descriptor, parent_path);
        self.stack.pop();
        result
    }

    fn members(&mut self, descriptor: &ObjectDescriptor, parent_path: Option<&str>) -> Result<Vec<Field>> {
        let mut fields = Vec::new();
        for member in merged_members(descriptor) {
            if member.ignore {
                continue;
            }
            if let Some(field) = self.field(&member, parent_path)? {
                fields.push(field);
            }
        }
        Ok(fields)
    }

    fn field(&mut self, member: &Member, parent_path: Option<&str>) -> Result<Option<Field>> {
        let mut field = Field::leaf(member.wire_name(), parent_path);
        if member.wire_name() != member.name {
            field.alias = Some(member.name.clone());
            field.path = join_path(parent_path, &member.name);
        }
        field.arguments.clone_from(&member.arguments);
        field.directives.clone_from(&member.directives);

        let Some(type_ref) = member.kind.object_type().copied() else {
            return Ok(Some(field));
        };

        // Budgets count per type. An enclosing bound on the same type wins
        // over a looser one declared further down.
        let budget = match (self.budgets.get(type_ref.id()).copied(), member.max_depth) {
            (Some(outer), Some(own)) => Some(outer.min(own)),
            (outer, own) => outer.or(own),
        };
        if budget == Some(0) {
            tracing::trace!(path = %field.path, "Max depth reached, dropping field");
            return Ok(None);
        }

        let previous = budget.and_then(|depth| self.budgets.insert(type_ref.id(), depth - 1));
        let expanded = self.expand(&mut field, type_ref, member);
        if budget.is_some() {
            match previous {
                Some(depth) => self.budgets.insert(type_ref.id(), depth),
                None => self.budgets.remove(type_ref.id()),
            };
        }

        Ok(expanded?.then_some(field))
    }

    /// Fills in the selection of an object-typed field. Returns false when
    /// nothing under it is selectable.
    fn expand(&mut self, field: &mut Field, type_ref: TypeRef, member: &Member) -> Result<bool> {
        let descriptor = type_ref.describe();
        let possible_types = merge_possible_types(&member.possible_types, &descriptor.possible_types);

        let mut selection_set = self.selection_set(type_ref, Some(&field.path))?;

        if !possible_types.is_empty() {
            selection_set.insert(0, Field::leaf(TYPENAME_FIELD, Some(&field.path)));
            for possible in possible_types {
                let concrete_path = format!("{}[{}]", field.path, possible.discriminator);
                let concrete_selection = self.selection_set(possible.type_ref, Some(&concrete_path))?;
                field.possible_types.push(PossibleTypeSelection {
                    discriminator: possible.discriminator,
                    type_name: possible.type_ref.describe().name,
                    selection_set: concrete_selection,
                });
            }
        }

        if selection_set.is_empty() {
            tracing::debug!(path = %field.path, type_name = %descriptor.name, "No selectable members, dropping field");
            return Ok(false);
        }

        field.base_type = Some(BaseType {
            is_abstract: descriptor.is_abstract || !field.possible_types.is_empty(),
            name: descriptor.name,
        });
        field.selection_set = selection_set;
        Ok(true)
    }
}

/// Collects inherited members base-most first followed by the shape's own.
///
/// A member redeclared further down the chain replaces the inherited one in
/// place, so enumeration order follows the first declaration.
fn merged_members(descriptor: &ObjectDescriptor) -> Vec<Member> {
    let mut chain = Vec::new();
    let mut seen = Vec::new();
    let mut base = descriptor.base;
    while let Some(base_ref) = base {
        if seen.contains(&base_ref.id()) {
            break;
        }
        seen.push(base_ref.id());
        let base_descriptor = base_ref.describe();
        base = base_descriptor.base;
        chain.push(base_descriptor);
    }

    let mut merged: Vec<Member> = Vec::new();
    for level in chain.iter().rev().chain(std::iter::once(descriptor)) {
        for member in &level.members {
            if let Some(existing) = merged.iter_mut().find(|m| m.name == member.name) {
                *existing = member.clone();
            } else {
                merged.push(member.clone());
            }
        }
    }
    merged
}

/// Member-level possible types first, then type-level ones not already named.
fn merge_possible_types(member: &[PossibleType], declared: &[PossibleType]) -> Vec<PossibleType> {
    let mut merged = member.to_vec();
    for possible in declared {
        if !merged
            .iter()
            .any(|existing| existing.discriminator == possible.discriminator)
        {
            merged.push(possible.clone());
        }
    }
    merged
}

/// Caches built trees by type identity.
#[derive(Debug, Default)]
pub struct FieldCache {
    entries: RwLock<HashMap<&'static str, Arc<Vec<Field>>>>,
}

impl FieldCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached tree for `T`, building it on first use.
    pub fn get_or_build<T: GraphQLObject>(&self) -> Result<Arc<Vec<Field>>> {
        self.get_or_build_type(TypeRef::of::<T>())
    }

    pub fn get_or_build_type(&self, type_ref: TypeRef) -> Result<Arc<Vec<Field>>> {
        if let Some(fields) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(type_ref.id())
        {
            return Ok(Arc::clone(fields));
        }

        let fields = Arc::new(FieldBuilder::build_type(type_ref)?);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(type_ref.id(), Arc::clone(&fields));
        Ok(fields)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Member;
    use crate::field::{walk_fields, FieldArgument, FieldDirective};

    struct Simple;
    impl GraphQLObject for Simple {
        fn descriptor() -> ObjectDescriptor {
            ObjectDescriptor::new("Query")
                .member(Member::scalar("A"))
                .member(Member::scalar("B"))
        }
    }

    struct Hello;
    impl GraphQLObject for Hello {
        fn descriptor() -> ObjectDescriptor {
            ObjectDescriptor::new("Hello").member(Member::scalar("Field1"))
        }
    }

    struct NestedQuery;
    impl GraphQLObject for NestedQuery {
        fn descriptor() -> ObjectDescriptor {
            ObjectDescriptor::new("Query").member(Member::object::<Hello>("Hello"))
        }
    }

    struct Aliased;
    impl GraphQLObject for Aliased {
        fn descriptor() -> ObjectDescriptor {
            ObjectDescriptor::new("Query")
                .member(Member::scalar("Hello1").field_name("hello"))
                .member(Member::scalar("Hello2").field_name("hello"))
        }
    }

    struct Node;
    impl GraphQLObject for Node {
        fn descriptor() -> ObjectDescriptor {
            ObjectDescriptor::new("Node")
                .member(Member::scalar("name"))
                .member(Member::object::<Node>("child"))
        }
    }

    struct BoundedNode;
    impl GraphQLObject for BoundedNode {
        fn descriptor() -> ObjectDescriptor {
            ObjectDescriptor::new("Node")
                .member(Member::scalar("name"))
                .member(Member::object::<BoundedNode>("child").max_depth(2))
        }
    }

    struct Planet;
    impl GraphQLObject for Planet {
        fn descriptor() -> ObjectDescriptor {
            ObjectDescriptor::new("Planet").member(Member::scalar("name"))
        }
    }

    struct Hero;
    impl GraphQLObject for Hero {
        fn descriptor() -> ObjectDescriptor {
            ObjectDescriptor::new("Hero")
                .member(Member::scalar("name"))
                .member(Member::object::<Planet>("homePlanet"))
                .member(Member::object::<Hero>("friends").max_depth(1))
        }
    }

    struct HeroQuery;
    impl GraphQLObject for HeroQuery {
        fn descriptor() -> ObjectDescriptor {
            ObjectDescriptor::new("Query").member(Member::object::<Hero>("hero"))
        }
    }

    struct NodeQuery;
    impl GraphQLObject for NodeQuery {
        fn descriptor() -> ObjectDescriptor {
            ObjectDescriptor::new("Query").member(Member::object::<Node>("node"))
        }
    }

    struct Animal;
    impl GraphQLObject for Animal {
        fn descriptor() -> ObjectDescriptor {
            ObjectDescriptor::new("Animal")
                .abstract_type()
                .member(Member::scalar("name"))
                .member(Member::scalar("legs"))
        }
    }

    struct Cat;
    impl GraphQLObject for Cat {
        fn descriptor() -> ObjectDescriptor {
            ObjectDescriptor::new("Cat")
                .extends::<Animal>()
                .member(Member::scalar("meows"))
                .member(Member::scalar("legs").field_name("pawCount"))
        }
    }

    struct Dog;
    impl GraphQLObject for Dog {
        fn descriptor() -> ObjectDescriptor {
            ObjectDescriptor::new("Dog")
                .extends::<Animal>()
                .member(Member::scalar("barks"))
        }
    }

    struct PetQuery;
    impl GraphQLObject for PetQuery {
        fn descriptor() -> ObjectDescriptor {
            ObjectDescriptor::new("Query").member(
                Member::object::<Animal>("pet")
                    .possible_type::<Cat>("Cat")
                    .possible_type::<Dog>("Dog"),
            )
        }
    }

    struct Annotated;
    impl GraphQLObject for Annotated {
        fn descriptor() -> ObjectDescriptor {
            ObjectDescriptor::new("Query")
                .member(
                    Member::scalar("hello")
                        .argument(FieldArgument::new("name", "String!", "helloName").required())
                        .directive(
                            FieldDirective::new("include")
                                .argument(FieldArgument::new("if", "Boolean!", "showHello")),
                        ),
                )
                .member(Member::scalar("secret").ignore())
        }
    }

    fn paths(fields: &[Field]) -> Vec<String> {
        let mut paths = Vec::new();
        walk_fields(fields, &mut |field| paths.push(field.path.clone()));
        paths
    }

    fn depth_of(field: &Field, child: &str) -> usize {
        field
            .selection_set
            .iter()
            .find(|f| f.name == child)
            .map_or(0, |next| 1 + depth_of(next, child))
    }

    #[test]
    fn test_build_simple_shape() {
        let fields = FieldBuilder::build::<Simple>().unwrap();
        assert_eq!(paths(&fields), vec!["A", "B"]);
        assert!(fields.iter().all(|f| f.alias.is_none() && f.is_leaf()));
    }

    #[test]
    fn test_build_is_deterministic() {
        let first = FieldBuilder::build::<PetQuery>().unwrap();
        let second = FieldBuilder::build::<PetQuery>().unwrap();
        assert_eq!(first, second);
        assert_eq!(paths(&first), paths(&second));
    }

    #[test]
    fn test_nested_field_paths() {
        let fields = FieldBuilder::build::<NestedQuery>().unwrap();
        let hello = &fields[0];
        assert_eq!(hello.path, "Hello");
        assert_eq!(hello.parent_path, None);
        assert_eq!(hello.base_type.as_ref().unwrap().name, "Hello");

        let field1 = &hello.selection_set[0];
        assert_eq!(field1.path, "Hello.Field1");
        assert_eq!(field1.parent_path.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_alias_for_renamed_members() {
        let fields = FieldBuilder::build::<Aliased>().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "hello");
        assert_eq!(fields[0].alias.as_deref(), Some("Hello1"));
        assert_eq!(fields[0].path, "Hello1");
        assert_eq!(fields[1].name, "hello");
        assert_eq!(fields[1].alias.as_deref(), Some("Hello2"));
        assert_eq!(fields[1].path, "Hello2");
    }

    #[test]
    fn test_self_reference_is_circular() {
        let error = FieldBuilder::build::<NodeQuery>().unwrap_err();
        assert_eq!(
            error,
            BuildError::CircularReference {
                type_name: "Node".to_string(),
                path: "node.child".to_string(),
            }
        );
    }

    #[test]
    fn test_max_depth_caps_recursion() {
        let fields = FieldBuilder::build::<BoundedNode>().unwrap();
        let root = Field {
            selection_set: fields,
            ..Field::leaf("root", None)
        };
        assert_eq!(depth_of(&root, "child"), 2);
        assert_eq!(
            paths(&root.selection_set),
            vec!["name", "child", "child.name", "child.child", "child.child.name"]
        );
    }

    #[test]
    fn test_max_depth_only_limits_recursive_type() {
        let fields = FieldBuilder::build::<HeroQuery>().unwrap();
        assert_eq!(
            paths(&fields),
            vec![
                "hero",
                "hero.name",
                "hero.homePlanet",
                "hero.homePlanet.name",
                "hero.friends",
                "hero.friends.name",
                "hero.friends.homePlanet",
                "hero.friends.homePlanet.name",
            ]
        );
    }

    #[test]
    fn test_possible_types() {
        let fields = FieldBuilder::build::<PetQuery>().unwrap();
        let pet = &fields[0];

        assert!(pet.is_polymorphic());
        assert!(pet.base_type.as_ref().unwrap().is_abstract);
        assert_eq!(pet.selection_set[0].name, TYPENAME_FIELD);

        let cat = pet.possible_type("Cat").unwrap();
        assert_eq!(cat.type_name, "Cat");
        let cat_paths = paths(&cat.selection_set);
        assert_eq!(cat_paths, vec!["pet[Cat].name", "pet[Cat].legs", "pet[Cat].meows"]);
        assert_eq!(cat.selection_set[1].name, "pawCount");

        assert!(pet.possible_type("Bird").is_none());
    }

    #[test]
    fn test_inherited_member_replaced_in_place() {
        let fields = FieldBuilder::build_type(TypeRef::of::<Cat>()).unwrap();
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["name", "pawCount", "meows"]);
    }

    #[test]
    fn test_arguments_directives_and_ignore() {
        let fields = FieldBuilder::build::<Annotated>().unwrap();
        assert_eq!(fields.len(), 1);
        let hello = &fields[0];
        assert_eq!(hello.arguments[0].variable_name, "helloName");
        assert!(hello.arguments[0].is_required);
        assert_eq!(hello.directives[0].directive_name, "include");
    }

    #[test]
    fn test_field_cache_reuses_trees() {
        let cache = FieldCache::new();
        let first = cache.get_or_build::<NestedQuery>().unwrap();
        let second = cache.get_or_build::<NestedQuery>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert!(cache.get_or_build::<NodeQuery>().is_err());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_annotated_fields_snapshot() {
        let fields = FieldBuilder::build::<Annotated>().unwrap();
        insta::assert_json_snapshot!(fields, @r#"
        [
          {
            "name": "hello",
            "path": "hello",
            "arguments": [
              {
                "argument_name": "name",
                "argument_type": "String!",
                "variable_name": "helloName",
                "is_required": true,
                "inline_argument": false
              }
            ],
            "directives": [
              {
                "directive_name": "include",
                "arguments": [
                  {
                    "argument_name": "if",
                    "argument_type": "Boolean!",
                    "variable_name": "showHello",
                    "is_required": false,
                    "inline_argument": false
                  }
                ]
              }
            ]
          }
        ]
        "#);
    }
}
