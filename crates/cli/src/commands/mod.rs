pub mod introspect;
pub mod query;
pub mod validate;

use graphql_fields::{Field, SelectionBuilder};

/// Fields for the dotted `paths` given on the command line.
pub fn selection(paths: &[String]) -> anyhow::Result<Vec<Field>> {
    if paths.iter().all(|path| path.trim().is_empty()) {
        anyhow::bail!("At least one field path is required, e.g. 'hero.name'");
    }
    Ok(SelectionBuilder::from_paths(paths).build())
}
