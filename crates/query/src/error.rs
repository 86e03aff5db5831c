use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Missing value for required argument '{argument_name}' (variable '{variable_name}') on '{path}'")]
    MissingRequiredArgument {
        argument_name: String,
        variable_name: String,
        path: String,
    },

    #[error("Argument '{variable_name}' does not match any argument declared in the selection set")]
    UnknownArgument { variable_name: String },
}
