use pokestore::errors::StorageError;
use thiserror::Error;

/// Custom error types for PokeAPI operations
#[derive(Error, Debug)]
pub enum PokeApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for PokeAPI operations
pub type Result<T> = std::result::Result<T, PokeApiError>;

impl From<PokeApiError> for StorageError {
    fn from(err: PokeApiError) -> Self {
        StorageError::RemoteUnavailable(err.to_string())
    }
}
