//! # Error Types
//!
//! Domain errors for the storefront client.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Core Error Categories                            │
//! │                                                                         │
//! │  ┌───────────────────────────┐      ┌───────────────────────────────┐  │
//! │  │        CoreError          │      │       ValidationError         │  │
//! │  │                           │      │                               │  │
//! │  │  ProductNotInCart         │      │  Required                     │  │
//! │  │  CartTooLarge             │◄─────│  TooLong                      │  │
//! │  │  QuantityTooLarge         │ From │  OutOfRange                   │  │
//! │  │  EmptyCart                │      │  MustBePositive               │  │
//! │  │  InvalidStatusTransition  │      │  InvalidFormat                │  │
//! │  └───────────────────────────┘      └───────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::{OrderStatus, ProductId};

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised before anything is sent to the backend.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Quantity change for a product the cart does not hold.
    #[error("Product {0} is not in the cart")]
    ProductNotInCart(ProductId),

    /// Cart has exceeded maximum allowed distinct products.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Checkout was attempted with nothing in the cart.
    #[error("Your cart is empty")]
    EmptyCart,

    /// Order status change that the lifecycle does not allow.
    ///
    /// Orders only move forward: processing → delivered or failed.
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        order_id: i64,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements and are raised
/// before any request is built.
#[derive(Debug, Error)]
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

    /// Invalid format (e.g., malformed email, wrong file type).
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
        let err = CoreError::QuantityTooLarge {
            requested: 1000,
            max: 999,
        };
        assert_eq!(err.to_string(), "Quantity 1000 exceeds maximum allowed (999)");

        let err = CoreError::InvalidStatusTransition {
            order_id: 7,
            from: OrderStatus::Delivered,
            to: OrderStatus::Failed,
        };
        assert_eq!(err.to_string(), "Order 7 cannot move from Delivered to Failed");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "email".to_string(),
        };
        assert_eq!(err.to_string(), "email is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "address".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
