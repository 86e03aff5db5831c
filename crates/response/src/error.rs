use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResponseError>;

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("Failed to deserialize response: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Invalid response envelope: {0}")]
    InvalidEnvelope(String),
}
