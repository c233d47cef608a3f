//! # Error Types
//!
//! Domain-specific error types for fiado-core.
//!
//! ## Error Hierarchy
//! - `CoreError` - business rule violations (stock, installment contract)
//! - `ValidationError` - input validation failures, caught before business
//!   logic runs and surfaced inline next to the offending field
//!
//! The db crate has its own `DbError`; the HTTP layer translates both into
//! an `ApiError` with a machine-readable code.
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, never manual impls
//! 2. Errors carry context (product name, quantities), never bare strings
//! 3. Each variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Requested quantity exceeds available stock.
    ///
    /// Surfaced inline next to the product picker; the rest of the draft
    /// stays intact and the composition session remains open.
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// An installment plan was requested with a count of zero.
    ///
    /// The caller must clamp the count to at least 1 before calling; this is
    /// a contract violation, not a divide-by-zero.
    #[error("Installment count must be at least 1")]
    InvalidInstallmentCount,

    /// An installment plan was requested for a worthless draft.
    ///
    /// Call sites must only schedule once the draft total is positive.
    #[error("Cannot schedule installments for a non-positive total ({total_cents} centavos)")]
    NonPositiveTotal { total_cents: i64 },

    /// The chosen payment method requires an installment plan but the draft
    /// has none.
    #[error("Payment method '{method}' requires an installment plan")]
    MissingInstallmentPlan { method: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, raised before any business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be a positive integer.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// A sale cannot be submitted without line items.
    #[error("Sale must contain at least one item")]
    EmptyDraft,
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
            product: "Café 500g".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Café 500g: available 3, requested 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customer_id".to_string(),
        };
        assert_eq!(err.to_string(), "customer_id is required");

        assert_eq!(
            ValidationError::EmptyDraft.to_string(),
            "Sale must contain at least one item"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::EmptyDraft;
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
