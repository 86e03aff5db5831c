use thiserror::Error;

pub type Result<T> = std::result::Result<T, IntrospectionError>;

#[derive(Debug, Error)]
pub enum IntrospectionError {
    #[error("Failed to parse introspection response: {0}")]
    Parse(String),

    #[error("Invalid introspection response: {0}")]
    Invalid(String),
}
