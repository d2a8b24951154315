use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
///
/// Store traits are backend-agnostic; concrete failures (a locked database
/// file, a failed statement) are wrapped here so the service layer only sees
/// "the operation did not complete".
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend failed while executing the named operation.
    #[error("storage unavailable while {operation}: {message}")]
    Unavailable {
        /// Short name of the operation that was in flight.
        operation: &'static str,
        /// Backend-specific failure message, for the logs.
        message: String,
        /// Underlying backend error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Wrap a backend failure, naming the operation that was in flight.
    pub fn unavailable(
        operation: &'static str,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        StorageError::Unavailable {
            operation,
            message: source.to_string(),
            source: Box::new(source),
        }
    }
}
