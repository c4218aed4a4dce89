//! # Error Types
//!
//! Domain-specific error types for quill-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  quill-core errors (this file)                                         │
//! │  ├── CoreError        - Pipeline failures (identifier exhaustion)      │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  quill-db errors                                                       │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  quill-render errors                                                   │
//! │  └── RenderError / MergeError / ExportError                            │
//! │                                                                         │
//! │  CLI errors                                                            │
//! │  └── AppError         - What the user sees                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Every drawn quote number was already taken.
    ///
    /// ## When This Occurs
    /// - The uniqueness oracle reported "used" for every attempt
    /// - Fatal for the create operation: no quote is written
    #[error("Could not find an unused quote number after {attempts} attempts")]
    IdentifierExhausted { attempts: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by the command layer before anything reaches storage or the
/// totals calculator.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. unparsable number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Discount would push the quote total below zero.
    #[error("discount {discount:.2} exceeds subtotal plus tax {gross:.2}")]
    DiscountExceedsTotal { discount: f64, gross: f64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::IdentifierExhausted { attempts: 100 };
        assert_eq!(
            err.to_string(),
            "Could not find an unused quote number after 100 attempts"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::DiscountExceedsTotal {
            discount: 150.0,
            gross: 120.0,
        };
        assert_eq!(
            err.to_string(),
            "discount 150.00 exceeds subtotal plus tax 120.00"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "description".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
