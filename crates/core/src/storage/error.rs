use thiserror::Error;

/// Failures reported by the storage engine.
///
/// Messages are the engine's own, passed through untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),
    #[error("Resource already exists: {0}")]
    AlreadyExists(String),
    #[error("Conditional check failed: {0}")]
    ConditionFailed(String),
    #[error("Request throttled: {0}")]
    Throttled(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("{code}: {message}")]
    Rejected { code: String, message: String },
}

impl BackendError {
    /// Builds a `Rejected` error from a backend error code and message.
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Errors that can occur during store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("Query needs an owner, an id, or both")]
    EmptyQuery,
    #[error("{field} must not contain the '|' delimiter: {value}")]
    ReservedDelimiter { field: &'static str, value: String },
    #[error("Subtable name must not be empty")]
    EmptySubtable,
    #[error("Record id must be a string, got {0}")]
    InvalidId(String),
    #[error("Record owner must be a string, got {0}")]
    InvalidOwner(String),
    #[error("Invalid table schema: {0}")]
    InvalidSchema(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
