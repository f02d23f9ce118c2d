//! # Error Types
//!
//! Domain-specific error types for apotheca-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  apotheca-core errors (this file)                                      │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  apotheca-db errors (separate crate)                                   │
//! │  └── DbError          - Store and transaction failures                 │
//! │                                                                         │
//! │  apotheca-actions errors                                               │
//! │  └── ActionError      - What the envelope reports                      │
//! │                                                                         │
//! │  Flow: ValidationError → FieldErrors → ServiceResponse { errors }      │
//! │        DbError → ActionError → ServiceResponse { message }             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// Stock would drop below zero while negative stock is rejected.
    #[error("Insufficient stock for item {item_id}: available {available}, requested {requested}")]
    InsufficientStock {
        item_id: i64,
        available: i64,
        requested: i64,
    },

    /// An amount left the representable decimal range.
    #[error("Amount is too large")]
    AmountOverflow,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised only while turning raw action input into typed payloads; the
/// repositories never see an invalid payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid date, malformed JSON).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A collection that needs at least one element is empty.
    #[error("{field} must contain at least one entry")]
    Empty { field: String },
}

impl ValidationError {
    /// Name of the field the error is attached to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::MustNotBeNegative { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::Empty { field } => field,
        }
    }
}

// =============================================================================
// Field Errors
// =============================================================================

/// Flattened validation failures keyed by top-level field name.
///
/// ## Serialization
/// ```json
/// { "date": ["date has invalid format: ..."], "saleItems": ["..."] }
/// ```
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Groups validation errors by the top-level field they belong to.
///
/// Nested paths such as `saleItems[0].quantity` are reported under
/// `saleItems`.
pub fn flatten_errors(errors: &[ValidationError]) -> FieldErrors {
    let mut flat = FieldErrors::new();
    for err in errors {
        let field = err.field();
        let top = field
            .split(|c| c == '[' || c == '.')
            .next()
            .unwrap_or(field)
            .to_string();
        flat.entry(top).or_default().push(err.to_string());
    }
    flat
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
        let err = CoreError::InsufficientStock {
            item_id: 7,
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for item 7: available 3, requested 5"
        );
    }

    #[test]
    fn test_flatten_groups_nested_fields() {
        let errors = vec![
            ValidationError::MustBePositive {
                field: "saleItems[0].quantity".to_string(),
            },
            ValidationError::MustNotBeNegative {
                field: "saleItems[1].price".to_string(),
            },
            ValidationError::Required {
                field: "date".to_string(),
            },
        ];

        let flat = flatten_errors(&errors);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat["saleItems"].len(), 2);
        assert_eq!(flat["date"], vec!["date is required".to_string()]);
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "date".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
