use thiserror::Error;

/// Failures of the embedding provider or the vector index
#[derive(Debug, Error)]
pub enum VectorError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Qdrant error: {0}")]
    Qdrant(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Embedding has {actual} dimensions, collection expects {expected}")]
    DimensionMismatch { expected: u32, actual: u32 },

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type VectorResult<T> = Result<T, VectorError>;

impl From<qdrant_client::QdrantError> for VectorError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        VectorError::Qdrant(err.to_string())
    }
}

impl From<reqwest::Error> for VectorError {
    fn from(err: reqwest::Error) -> Self {
        VectorError::Embedding(err.to_string())
    }
}
