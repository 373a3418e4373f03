//! Storage-specific error type wrapping file and JSON errors.

use weatherbell_domain::error::WeatherbellError;

/// Errors originating from the JSON file storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the store file failed.
    #[error("file error")]
    Io(#[from] std::io::Error),

    /// Failed to serialize or deserialize the stored JSON document.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}

impl From<StorageError> for WeatherbellError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
