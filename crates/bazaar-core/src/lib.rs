//! # bazaar-core: Pure Business Logic for Bazaar
//!
//! This crate is the **heart** of the Bazaar cart and order engine. It holds
//! the aggregates and their rules as plain data plus pure functions, with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP (apps/api, axum)                        │   │
//! │  │    /api/cart/{userId}/add, /api/orders, /api/orders/{id} ...    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          CartStore / OrderStore (per-key locking)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bazaar-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │   cart    │  │   order   │  │ validation│  │   │
//! │  │   │   Money   │  │   Cart    │  │   Order   │  │   rules   │  │   │
//! │  │   │  totals   │  │ CartItem  │  │  Status   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO LOCKS • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  bazaar-db (Database Layer)                     │   │
//! │  │            SQLite snapshots of carts, orders, catalog           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic and line/cart totals
//! - [`cart`] - Cart aggregate (items plus derived total)
//! - [`order`] - Order aggregate and status transitions
//! - [`types`] - Shared value types (catalog entries, policies, listings)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use bazaar_core::{Cart, Money};
//!
//! let mut cart = Cart::new("u1");
//! cart.add_item("p1", 2, Money::from_cents(100)).unwrap();
//! cart.add_item("p1", 3, Money::from_cents(100)).unwrap();
//!
//! assert_eq!(cart.items()[0].quantity, 5);
//! assert_eq!(cart.total().cents(), 500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod order;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{NewOrder, Order, OrderStatus, StatusPolicy};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts and keeps order snapshots a reasonable size.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line in a cart or order.
///
/// ## Business Reason
/// Catches accidental over-ordering (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum unit price of a line, in cents ($10,000,000.00).
///
/// ## Business Reason
/// Rejects mistyped prices. At this bound a full cart of maximum-quantity
/// lines still totals well inside `i64`.
pub const MAX_UNIT_PRICE: i64 = 1_000_000_000;
