//! # AppError
//!
//! Centralized error handling for Rusty-Reader.
//! Maps validation, lookup and storage failures to actionable error types.

use thiserror::Error;

/// The primary error type for all rr-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Resource not found (e.g., a stored image file)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// A submitted value is empty, too long, or not a number where one is expected
    #[error("validation error: {0}")]
    ValidationError(String),

    /// A required form key was not submitted at all
    #[error("missing form field: {0}")]
    MissingField(String),

    /// A form key was submitted with no values
    #[error("no value submitted for form field: {0}")]
    EmptyField(String),

    /// A foreign key points at a row that does not exist
    #[error("{entity} ID: \"{id}\" does not exist")]
    MissingReference { entity: &'static str, id: i32 },

    /// An entity name with no registered logic service
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// Resource already exists (e.g., duplicate board url)
    #[error("{0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., DB down, feed unreachable)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    /// Errors caused by what the user submitted, as opposed to infrastructure failures.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AppError::ValidationError(_)
                | AppError::MissingField(_)
                | AppError::EmptyField(_)
                | AppError::MissingReference { .. }
                | AppError::Conflict(_)
        )
    }
}

/// A specialized Result type for Rusty-Reader logic.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_reference_message_names_the_id() {
        let err = AppError::MissingReference { entity: "Host", id: 42 };
        assert_eq!(err.to_string(), "Host ID: \"42\" does not exist");
    }

    #[test]
    fn only_input_errors_are_user_errors() {
        assert!(AppError::ValidationError("x".into()).is_user_error());
        assert!(AppError::MissingField("name".into()).is_user_error());
        assert!(AppError::EmptyField("name".into()).is_user_error());
        assert!(AppError::Conflict("dup".into()).is_user_error());
        assert!(!AppError::Internal("db down".into()).is_user_error());
        assert!(!AppError::UnknownEntity("Post".into()).is_user_error());
    }
}
