//! Storage trait abstraction.

use async_trait::async_trait;

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Key cannot be used as a storage name
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Persistence store for snapshot blobs.
///
/// Blobs are opaque to the store; the medium (file, key-value store,
/// embedded database) is up to the implementation.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Save a blob under `key`, replacing any previous blob.
    ///
    /// Returning `Ok` acknowledges the blob is durable.
    async fn save(&mut self, key: &str, blob: &[u8]) -> Result<()>;

    /// Load the blob stored under `key`, if any.
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;
}

/// Keys double as file names, so keep them to a safe alphabet.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
