//! Output filters: prune the selection set to the members a projection reads,
//! then narrow the deserialized value with that projection.
//!
//! ```
//! use graphql_fields::OutputFilter;
//!
//! struct Full { name: Option<String>, height: Option<f64> }
//!
//! let filter = OutputFilter::new(["hero.name"], |full: Full| full.name);
//! assert!(filter.selection().unwrap().keeps("hero"));
//! assert!(filter.selection().unwrap().keeps("hero.name"));
//! assert!(!filter.selection().unwrap().keeps("hero.height"));
//! ```

use crate::field::{Field, TYPENAME_FIELD};
use std::fmt;
use std::sync::Arc;

/// The member paths a projection reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSelection {
    paths: Vec<String>,
}

impl PathSelection {
    #[must_use]
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// True when `path` is one of the captured paths, an ancestor of one, or
    /// lies inside a captured member (which the projection reads whole).
    #[must_use]
    pub fn keeps(&self, path: &str) -> bool {
        self.is_ancestor(path) || self.covers(path)
    }

    /// `path` is a captured path or lies below one.
    #[must_use]
    pub fn covers(&self, path: &str) -> bool {
        self.paths
            .iter()
            .any(|captured| captured == path || is_segment_prefix(captured, path))
    }

    /// `path` is a strict ancestor of a captured path.
    #[must_use]
    pub fn is_ancestor(&self, path: &str) -> bool {
        self.paths
            .iter()
            .any(|captured| is_segment_prefix(path, captured))
    }
}

/// `prefix` names an ancestor of `path` on a dot boundary.
fn is_segment_prefix(prefix: &str, path: &str) -> bool {
    path.len() > prefix.len()
        && path.starts_with(prefix)
        && path.as_bytes()[prefix.len()] == b'.'
}

/// Removes every field the selection does not keep.
///
/// A parent whose children were all removed is removed as well. The
/// discriminator and possible-type selections of a kept polymorphic field are
/// always retained.
#[must_use]
pub fn prune(fields: &[Field], selection: &PathSelection) -> Vec<Field> {
    fields
        .iter()
        .filter_map(|field| prune_field(field, selection))
        .collect()
}

fn prune_field(field: &Field, selection: &PathSelection) -> Option<Field> {
    if field.name == TYPENAME_FIELD || selection.covers(&field.path) {
        return Some(field.clone());
    }
    if !selection.is_ancestor(&field.path) {
        return None;
    }
    if field.is_leaf() {
        return Some(field.clone());
    }

    let selection_set = prune(&field.selection_set, selection);
    let has_members = selection_set.iter().any(|child| child.name != TYPENAME_FIELD);
    if !has_members && !field.is_polymorphic() {
        return None;
    }

    Some(Field {
        selection_set,
        ..field.clone()
    })
}

/// Prunes the query to the members a projection reads and applies the
/// projection to the deserialized value.
pub struct OutputFilter<T, U> {
    selection: Option<PathSelection>,
    projection: Arc<dyn Fn(T) -> U + Send + Sync>,
}

impl<T> OutputFilter<T, T> {
    /// Keeps every field and returns the value unchanged.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            selection: None,
            projection: Arc::new(|value| value),
        }
    }
}

impl<T> Default for OutputFilter<T, T> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<T, U> OutputFilter<T, U> {
    /// Creates a filter from the member paths `projection` reads.
    ///
    /// Every path the projection touches must be listed, otherwise the
    /// corresponding field is pruned from the query and arrives as null.
    #[must_use]
    pub fn new<I, S, F>(paths: I, projection: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Self {
            selection: Some(PathSelection::new(paths)),
            projection: Arc::new(projection),
        }
    }

    #[must_use]
    pub const fn selection(&self) -> Option<&PathSelection> {
        self.selection.as_ref()
    }

    /// The selection set to send for this filter.
    #[must_use]
    pub fn apply_to_fields(&self, fields: &[Field]) -> Vec<Field> {
        match &self.selection {
            Some(selection) => prune(fields, selection),
            None => fields.to_vec(),
        }
    }

    pub fn project(&self, value: T) -> U {
        (self.projection)(value)
    }
}

impl<T, U> Clone for OutputFilter<T, U> {
    fn clone(&self) -> Self {
        Self {
            selection: self.selection.clone(),
            projection: Arc::clone(&self.projection),
        }
    }
}

impl<T, U> fmt::Debug for OutputFilter<T, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputFilter")
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{BaseType, PossibleTypeSelection};

    fn object(name: &str, parent: Option<&str>, children: &[&str]) -> Field {
        let mut field = Field::leaf(name, parent);
        field.selection_set = children
            .iter()
            .map(|child| Field::leaf(*child, Some(&field.path)))
            .collect();
        field.base_type = Some(BaseType {
            name: name.to_string(),
            is_abstract: false,
        });
        field
    }

    #[test]
    fn test_keeps_on_segment_boundary() {
        let selection = PathSelection::new(["hero.name"]);
        assert!(selection.keeps("hero"));
        assert!(selection.keeps("hero.name"));
        assert!(!selection.keeps("her"));
        assert!(!selection.keeps("hero.nameLength"));
        assert!(!selection.keeps("heroes"));
    }

    #[test]
    fn test_captured_object_keeps_descendants() {
        let selection = PathSelection::new(["hero"]);
        assert!(selection.keeps("hero.friends.name"));
        assert!(!selection.keeps("villain"));
    }

    #[test]
    fn test_prune_keeps_ancestors_of_selected_leaves() {
        let fields = vec![
            object("hero", None, &["name", "height"]),
            Field::leaf("version", None),
        ];
        let pruned = prune(&fields, &PathSelection::new(["hero.name"]));

        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned[0].path, "hero");
        let children: Vec<_> = pruned[0].selection_set.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(children, vec!["hero.name"]);
    }

    #[test]
    fn test_prune_drops_emptied_parent() {
        let fields = vec![object("hero", None, &["name"]), Field::leaf("version", None)];
        let pruned = prune(&fields, &PathSelection::new(["version", "hero.missing"]));
        let paths: Vec<_> = pruned.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["version"]);
    }

    #[test]
    fn test_prune_retains_polymorphic_selections() {
        let mut pet = object("pet", None, &[TYPENAME_FIELD, "name"]);
        pet.possible_types.push(PossibleTypeSelection {
            discriminator: "Cat".to_string(),
            type_name: "Cat".to_string(),
            selection_set: vec![Field::leaf("meows", Some("pet[Cat]"))],
        });

        let pruned = prune(&[pet], &PathSelection::new(["pet.other"]));
        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned[0].selection_set.len(), 1);
        assert_eq!(pruned[0].selection_set[0].name, TYPENAME_FIELD);
        assert_eq!(pruned[0].possible_types.len(), 1);
    }

    #[test]
    fn test_output_filter_projects() {
        let filter = OutputFilter::new(["name"], |pair: (String, u32)| pair.0);
        assert_eq!(filter.project(("Luke".to_string(), 19)), "Luke");

        let identity = OutputFilter::<u32, u32>::identity();
        assert!(identity.selection().is_none());
        assert_eq!(identity.project(7), 7);
    }
}
