//! # Error Types
//!
//! Domain-specific error types for zoo-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  zoo-core errors (this file)                                            │
//! │  ├── CoreError        - Business rule rejections                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  zoo-db errors (separate crate)                                         │
//! │  └── DbError          - Database failures, wraps CoreError              │
//! │                                                                         │
//! │  storefront errors (in app)                                             │
//! │  └── ApiError         - What the caller sees (serialized)               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Caller        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `CoreError` is a user-facing, locally recoverable condition. None of
//! them are retried; the customer acts again (re-adds to cart, re-applies the
//! promo, resubmits checkout).

use thiserror::Error;

use crate::promo::PromoRejection;
use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Quantity is zero or negative.
    #[error("Quantity must be a positive whole number, got {quantity}")]
    InvalidQuantity { quantity: i64 },

    /// Requested cart quantity exceeds current stock.
    ///
    /// ## When This Occurs
    /// - Adding to cart when `in_cart + requested > available`
    /// - Setting a cart line above the available stock
    ///
    /// ## User Workflow
    /// ```text
    /// Cart holds 2 × "Dry cat food", stock is 3
    ///      │
    ///      ▼
    /// add_to_cart(qty: 2)
    ///      │
    ///      ▼
    /// OutOfStock { available: 3, in_cart: 2, requested: 2 }
    ///      │
    ///      ▼
    /// Cart unchanged, caller shows "Only 3 in stock"
    /// ```
    #[error("Not enough \"{product}\" in stock: available {available}, in cart {in_cart}, requested {requested}")]
    OutOfStock {
        product: String,
        available: i64,
        in_cart: i64,
        requested: i64,
    },

    /// No promo with this code exists.
    #[error("Promo code not found: {0}")]
    PromoNotFound(String),

    /// Promo exists but fails an eligibility check.
    #[error("Promo code {code} cannot be applied: {reason}")]
    PromoInvalid { code: String, reason: PromoRejection },

    /// The discount carried in the session disagrees with the recomputed one.
    ///
    /// ## When This Occurs
    /// - Session value was edited by the client
    /// - Session value is not a decimal amount
    ///
    /// Checkout is aborted and the promo is cleared from the session.
    #[error("Promo code {code} must be applied again")]
    PromoTampering { code: String },

    /// Stock ran out between cart and checkout.
    ///
    /// ## When This Occurs
    /// - Another order took the units after they were added to this cart
    /// - Staff lowered the stock level
    ///
    /// The whole checkout is rolled back.
    #[error("Not enough \"{product}\" in stock: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Checkout attempted with no cart items.
    #[error("Cart is empty")]
    EmptyCart,

    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Customer cannot be found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Cart item does not exist or belongs to another customer.
    #[error("Cart item not found: {0}")]
    CartItemNotFound(String),

    /// Order does not exist or belongs to another customer.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Order status change that does not move forward.
    #[error("Order cannot move from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    /// Customer already reviewed this product.
    #[error("Product {product_id} has already been reviewed by this customer")]
    DuplicateReview { product_id: String },

    /// Review does not exist or belongs to another customer.
    #[error("Review not found: {0}")]
    ReviewNotFound(String),

    /// Actor may not perform this operation.
    ///
    /// ## When This Occurs
    /// - Staff account attempts to place an order
    /// - Customer attempts a staff operation
    #[error("Not permitted: {reason}")]
    NotPermitted { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Shorthand for a [`CoreError::NotPermitted`].
    pub fn not_permitted(reason: impl Into<String>) -> Self {
        CoreError::NotPermitted {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
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

    /// Invalid format (e.g., bad promo code characters, bad amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
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
    use crate::money::Money;

    #[test]
    fn test_out_of_stock_message() {
        let err = CoreError::OutOfStock {
            product: "Dry cat food 2kg".to_string(),
            available: 3,
            in_cart: 2,
            requested: 2,
        };
        assert_eq!(
            err.to_string(),
            "Not enough \"Dry cat food 2kg\" in stock: available 3, in cart 2, requested 2"
        );
    }

    #[test]
    fn test_promo_invalid_message_includes_reason() {
        let err = CoreError::PromoInvalid {
            code: "SPRING5".to_string(),
            reason: PromoRejection::BelowMinimum {
                min: Money::from_cents(3000),
            },
        };
        assert_eq!(
            err.to_string(),
            "Promo code SPRING5 cannot be applied: order amount must be at least 30.00"
        );
    }

    #[test]
    fn test_status_transition_message() {
        let err = CoreError::InvalidStatusTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::Processing,
        };
        assert_eq!(err.to_string(), "Order cannot move from delivered to processing");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "article".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Validation error: article is required");
    }
}
