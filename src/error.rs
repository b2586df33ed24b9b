//! Error types for treestore.

use thiserror::Error;

/// Common error type for treestore.
///
/// Absent records and records owned by another user both surface as
/// `NotFound`, so callers cannot tell foreign data from missing data.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Username, credential, folder or file not found for this user.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Uniqueness violated (username taken, duplicate sibling name).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A folder-tree invariant does not hold.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Backing store failure, including a failed commit or a closed handle.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The operation did not finish before its deadline.
    #[error("operation timed out")]
    Timeout,

    /// Rejected input.
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound("record"),
            sqlx::Error::PoolTimedOut => StoreError::Timeout,
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

impl StoreError {
    /// Whether the error is the caller-visible "does not exist" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Result type alias for treestore operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error_display() {
        let err = StoreError::NotFound("folder");
        assert_eq!(err.to_string(), "folder not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_conflict_error_display() {
        let err = StoreError::Conflict("username already taken".to_string());
        assert_eq!(err.to_string(), "conflict: username already taken");
    }

    #[test]
    fn test_timeout_error_display() {
        assert_eq!(StoreError::Timeout.to_string(), "operation timed out");
    }

    #[test]
    fn test_row_not_found_conversion() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_pool_timed_out_conversion() {
        let err: StoreError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, StoreError::Timeout));
    }

    #[test]
    fn test_pool_closed_is_unavailable() {
        let err: StoreError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: StoreError = io_err.into();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }
}
