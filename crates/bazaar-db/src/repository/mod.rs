//! # Repository Module
//!
//! Database repository implementations for Bazaar.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories and Their Callers                       │
//! │                                                                         │
//! │  CartStore (apps/api)                                                  │
//! │       │  db.carts().upsert(&working_copy)                              │
//! │       ▼                                                                 │
//! │  CartRepository ──────────► carts    (one JSON snapshot per owner)     │
//! │                                                                         │
//! │  OrderStore (apps/api)                                                 │
//! │       │  db.orders().insert(&order) / update_status(&order)            │
//! │       ▼                                                                 │
//! │  OrderRepository ─────────► orders   (append + status column)          │
//! │                                                                         │
//! │  DbCatalog (apps/api), seed binary                                     │
//! │       │  db.products().get_by_id(id)                                   │
//! │       ▼                                                                 │
//! │  ProductRepository ───────► products (read-mostly catalog)             │
//! │                                                                         │
//! │  The stores own the in-memory state; repositories only persist it and  │
//! │  hand it back at startup (`load_all`).                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CartRepository`](cart::CartRepository) - Cart snapshots
//! - [`OrderRepository`](order::OrderRepository) - Orders and status updates
//! - [`ProductRepository`](product::ProductRepository) - Catalog lookups

pub mod cart;
pub mod order;
pub mod product;
