//! Store error types

/// Error type for message store operations
#[derive(Debug)]
pub enum StoreError {
    /// The operation did not complete within its deadline
    Timeout,
    /// The underlying database rejected the operation
    Database(rusqlite::Error),
    /// The blocking worker for the operation failed
    Internal(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Timeout => write!(f, "Store operation timed out"),
            StoreError::Database(e) => write!(f, "Database error: {}", e),
            StoreError::Internal(msg) => write!(f, "Store internal error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e)
    }
}
