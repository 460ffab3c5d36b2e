use thiserror::Error;

/// Errors common to every database backend
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;
