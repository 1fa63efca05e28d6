//! # Error Types
//!
//! Domain-specific error types for cloudpos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cloudpos-core errors (this file)                                       │
//! │  ├── CoreError        - Cart and domain rule violations                 │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  cloudpos-store errors (separate crate)                                 │
//! │  └── StoreError       - Durable queue failures (duplicate key, ...)     │
//! │                                                                         │
//! │  cloudpos-sync errors (separate crate)                                  │
//! │  └── SyncError        - Remote commit / drain failures                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SyncError → user-visible string    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ids, limits, actual values)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations. They are caught at the
/// orchestration boundary and translated to user-facing messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has exceeded maximum allowed items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Cart operation referenced a product that is not in the cart.
    #[error("Product {0} not in cart")]
    ProductNotInCart(String),

    /// Payment method string outside the closed set.
    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised when a record fails its structural rules before it is allowed
/// anywhere near the durable queue.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be at least one.
    #[error("{field} must be at least 1, got {actual}")]
    MustBePositive { field: String, actual: i64 },

    /// Monetary value must not be negative.
    #[error("{field} must not be negative, got {actual} cents")]
    NegativeAmount { field: String, actual: i64 },

    /// The stored totals do not add up.
    #[error("total ({total}c) != subtotal ({subtotal}c) + tax ({tax}c)")]
    TotalMismatch { subtotal: i64, tax: i64, total: i64 },
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
        let err = CoreError::QuantityTooLarge {
            requested: 1000,
            max: 999,
        };
        assert_eq!(
            err.to_string(),
            "Quantity 1000 exceeds maximum allowed (999)"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::TotalMismatch {
            subtotal: 1100,
            tax: 0,
            total: 1200,
        };
        assert_eq!(err.to_string(), "total (1200c) != subtotal (1100c) + tax (0c)");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "store_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
