//! # Error Types
//!
//! Domain-specific error types for bazaar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bazaar-core errors (this file)                                        │
//! │  ├── CoreError        - Domain errors (not found, bad transition, ...) │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bazaar-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  HTTP API errors (apps/api)                                            │
//! │  └── ApiError         - What clients see ({ code, message })           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → HTTP response          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant leaves the aggregate it was raised from untouched: the
/// check runs before any mutation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No cart has ever been created for this owner.
    ///
    /// ## When This Occurs
    /// - `remove` or `update` for an owner who never added anything
    ///   (a plain `get` does not create a cart)
    #[error("Cart not found for owner: {0}")]
    CartNotFound(String),

    /// The cart exists but holds no line for the product.
    #[error("Item {product_id} not found in cart of {owner_id}")]
    CartItemNotFound {
        owner_id: String,
        product_id: String,
    },

    /// Order id is unknown.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Catalog has no entry for the product.
    ///
    /// ## When This Occurs
    /// - Add-to-cart without a price, and the catalog cannot price the product
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Catalog marks the product unavailable and the stock policy forbids it.
    #[error("Product {0} is not available")]
    ProductUnavailable(String),

    /// Status change not allowed by the transition table.
    ///
    /// ## When This Occurs
    /// ```text
    /// delivered ──► pending      ❌ terminal state
    /// pending   ──► shipped      ❌ must go through processing
    /// processing ─► cancelled    ✅
    /// ```
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        order_id: String,
        from: String,
        to: String,
    },

    /// Cart has reached the maximum number of distinct lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// The operation that raised one has no side effect.
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

    /// Invalid format (e.g., invalid UUID).
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
