use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("SQLite operation failed: {0}")]
    SQLite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Remote source unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Could not extract pokedex number from resource: {0}")]
    MalformedResource(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StorageError {
    /// Stable name of the error variant, reported alongside the message by
    /// the HTTP layer.
    pub fn kind(&self) -> &'static str {
        match self {
            StorageError::SQLite(_) => "SQLiteError",
            StorageError::Io(_) => "IoError",
            StorageError::Json(_) => "JsonError",
            StorageError::Config(_) => "ConfigError",
            StorageError::NotFound(_) => "NotFoundError",
            StorageError::RemoteUnavailable(_) => "RemoteUnavailable",
            StorageError::MalformedResource(_) => "MalformedResource",
            StorageError::Other(_) => "Exception",
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
