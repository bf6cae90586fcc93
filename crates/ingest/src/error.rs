use thiserror::Error;

use auraverse_core::CoreError;
use auraverse_storage::StorageError;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Empty or malformed submission. The client's fault; not retried.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The raw store could not be written. Carries the error-log id.
    #[error("storage write failed: {source}")]
    StorageWrite {
        #[source]
        source: StorageError,
        error_id: String,
    },
}

impl From<CoreError> for IngestError {
    fn from(e: CoreError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

impl IngestError {
    /// Map to an HTTP status code for API responses.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::StorageWrite { .. } => 500,
        }
    }

    pub fn error_id(&self) -> Option<&str> {
        match self {
            Self::StorageWrite { error_id, .. } => Some(error_id),
            Self::InvalidInput(_) => None,
        }
    }
}
