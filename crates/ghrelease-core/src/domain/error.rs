//! Domain-level error taxonomy for ghrelease.

/// ghrelease domain errors.
#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error("remote operation {operation} failed for {key}: {message}")]
    Remote {
        operation: String,
        key: String,
        message: String,
    },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("{name} is out of range ({value}): {message}")]
    ArgumentOutOfRange {
        name: String,
        value: i64,
        message: String,
    },

    #[error("git error: {0}")]
    Git(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReleaseError {
    pub fn not_found(entity: &str, key: impl std::fmt::Display) -> Self {
        ReleaseError::NotFound {
            entity: entity.to_string(),
            key: key.to_string(),
        }
    }

    pub fn remote(operation: &str, key: impl std::fmt::Display, message: impl Into<String>) -> Self {
        ReleaseError::Remote {
            operation: operation.to_string(),
            key: key.to_string(),
            message: message.into(),
        }
    }

    /// Whether this error was produced by an observed cancellation request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ReleaseError::Cancelled)
    }
}

/// Result type for ghrelease domain operations.
pub type Result<T> = std::result::Result<T, ReleaseError>;
