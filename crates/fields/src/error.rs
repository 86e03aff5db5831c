use thiserror::Error;

pub type Result<T> = std::result::Result<T, BuildError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A type selects into itself (directly or transitively) without a
    /// max-depth bound on the recursive member.
    #[error("Circular reference to type '{type_name}' at '{path}'; add a max depth to the recursive member")]
    CircularReference { type_name: String, path: String },
}
