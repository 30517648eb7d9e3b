//! # Error Types
//!
//! Domain-specific error types for pleyazul-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pleyazul-core errors (this file)                                      │
//! │  ├── CoreError        - Generator and domain failures                  │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  pleyazul-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  pleyazul-fulfillment errors (service crate)                           │
//! │  └── FulfillmentError - What the transport layer sees                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → FulfillmentError → caller         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::OracleType;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent domain rule violations inside the reading generator.
/// A well-formed catalog never produces them at runtime.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The catalog slice for an oracle cannot satisfy the spread's draw
    /// count without repeating items.
    ///
    /// ## When This Occurs
    /// - Content catalog was truncated or mis-loaded
    /// - A spread demands more cards than the deck holds
    ///
    /// This is a configuration defect, never a user error.
    #[error("{oracle} catalog has {available} items, spread requires {required}")]
    InsufficientCatalog {
        oracle: OracleType,
        available: usize,
        required: usize,
    },

    /// A spread definition is structurally unusable.
    ///
    /// ## When This Occurs
    /// - Draw count of zero
    /// - Count/oracle combination that makes no sense
    #[error("Spread {spread_id} is malformed: {reason}")]
    MalformedSpread { spread_id: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements. Used for
/// early validation before any order is persisted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., malformed email address).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
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
        let err = CoreError::InsufficientCatalog {
            oracle: OracleType::Tarot,
            available: 2,
            required: 3,
        };
        assert_eq!(
            err.to_string(),
            "tarot catalog has 2 items, spread requires 3"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "email".to_string(),
        };
        assert_eq!(err.to_string(), "email is required");

        let err = ValidationError::TooLong {
            field: "custom_question".to_string(),
            max: 500,
        };
        assert_eq!(
            err.to_string(),
            "custom_question must be at most 500 characters"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "spread_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
