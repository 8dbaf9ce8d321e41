//! # Error Types
//!
//! Domain-specific error types for bookstore-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bookstore-core errors (this file)                                     │
//! │  ├── CoreError        - Record resolution failures                     │
//! │  └── ValidationError  - Field/constraint validation failures           │
//! │                                                                         │
//! │  bookstore-db errors (separate crate)                                  │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── ImportError      - Why a single import record was skipped         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ImportError → ImportReport        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised while turning a tagged record into a typed entity.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The record's kind label is not one of the five entity kinds.
    ///
    /// ## When This Occurs
    /// - Typo in the fixture (`"publsher"`)
    /// - Record for a model this schema doesn't have (`"author"`)
    #[error("Unknown entity kind: '{0}'")]
    UnknownKind(String),

    /// The label resolved but the fields didn't.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before anything reaches the database, so a bad record never
/// becomes a half-built entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., unparsable price or date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// JSON value has the wrong type for the field.
    #[error("{field} must be {expected}")]
    InvalidType { field: String, expected: String },

    /// Field name is not part of the target entity.
    #[error("{entity} has no field named '{field}'")]
    UnknownField { entity: String, field: String },
}

impl ValidationError {
    /// Creates a Required error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an InvalidType error.
    pub fn invalid_type(field: impl Into<String>, expected: impl Into<String>) -> Self {
        ValidationError::InvalidType {
            field: field.into(),
            expected: expected.into(),
        }
    }

    /// Creates an InvalidFormat error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Result of resolving a fixture record.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::UnknownKind("author".to_string());
        assert_eq!(err.to_string(), "Unknown entity kind: 'author'");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("title");
        assert_eq!(err.to_string(), "title is required");

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        };
        assert_eq!(err.to_string(), "name must be at most 100 characters");

        let err = ValidationError::UnknownField {
            entity: "book".to_string(),
            field: "isbn".to_string(),
        };
        assert_eq!(err.to_string(), "book has no field named 'isbn'");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("pk").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
