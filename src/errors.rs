use thiserror::Error;

/// Unified error type used across the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    // Additional variants for common string error patterns
    // These preserve the exact original error message without adding prefixes
    #[error("{0}")]
    DatabaseLock(String),

    #[error("{0}")]
    PostOperation(String),

    #[error("{0}")]
    TagOperation(String),

    #[error("{0}")]
    Custom(String),
}

impl AppError {
    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a database lock error
    pub fn database_lock(message: impl Into<String>) -> Self {
        Self::DatabaseLock(message.into())
    }

    /// Create a post operation error
    pub fn post_operation(message: impl Into<String>) -> Self {
        Self::PostOperation(message.into())
    }

    /// Create a tag operation error
    pub fn tag_operation(message: impl Into<String>) -> Self {
        Self::TagOperation(message.into())
    }

    /// Create a custom error (for arbitrary string error messages)
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}

/// Result type used across the application
pub type AppResult<T> = Result<T, AppError>;

/// Conversion from String (preserves the original error message)
impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Custom(msg)
    }
}

/// Conversion from &str (preserves the original error message)
impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Custom(msg.to_string())
    }
}

/// Conversion to String for the transport boundary; handlers rely on this
/// through `?`
impl From<AppError> for String {
    fn from(err: AppError) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = AppError::validation("tags", "empty tag list");
        assert_eq!(err.to_string(), "Validation error: tags - empty tag list");
    }

    #[test]
    fn test_wrapped_database_error_keeps_source_message() {
        let err = AppError::Database(rusqlite::Error::QueryReturnedNoRows);
        assert!(err.to_string().starts_with("Database error:"));
    }

    #[test]
    fn test_string_round_trip() {
        let err: AppError = "something broke".into();
        let msg: String = err.into();
        assert_eq!(msg, "something broke");
    }
}
