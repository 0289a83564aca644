//! # Catalog Boundary
//!
//! Supplies product price and availability to add-to-cart.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_priced(u1, p1, 2, price?)                                          │
//! │       │                                                                 │
//! │       ├── price given and StockPolicy::Ignore ──► no lookup             │
//! │       │                                                                 │
//! │       └── otherwise ──► Catalog::lookup(p1)                             │
//! │                              │                                          │
//! │               ┌──────────────┴──────────────┐                           │
//! │               ▼                             ▼                           │
//! │        StaticCatalog                    DbCatalog                       │
//! │        (HashMap, memory mode/tests)     (products table)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Prices are taken at face value; the cart does not re-check freshness.

use std::collections::HashMap;

use async_trait::async_trait;

use bazaar_core::CatalogEntry;
use bazaar_db::Database;

use super::StoreResult;

/// Source of product price and availability.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Returns the entry for `product_id`, or `None` if the catalog has no
    /// such product.
    async fn lookup(&self, product_id: &str) -> StoreResult<Option<CatalogEntry>>;
}

// =============================================================================
// Static Catalog
// =============================================================================

/// Fixed in-memory catalog.
#[derive(Debug, Default, Clone)]
pub struct StaticCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl StaticCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding `entries`, keyed by product id.
    pub fn with_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        StaticCatalog {
            entries: entries
                .into_iter()
                .map(|entry| (entry.product_id.clone(), entry))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl Catalog for StaticCatalog {
    async fn lookup(&self, product_id: &str) -> StoreResult<Option<CatalogEntry>> {
        Ok(self.entries.get(product_id).cloned())
    }
}

// =============================================================================
// Database Catalog
// =============================================================================

/// Catalog backed by the `products` table.
#[derive(Debug, Clone)]
pub struct DbCatalog {
    db: Database,
}

impl DbCatalog {
    pub fn new(db: Database) -> Self {
        DbCatalog { db }
    }
}

#[async_trait]
impl Catalog for DbCatalog {
    async fn lookup(&self, product_id: &str) -> StoreResult<Option<CatalogEntry>> {
        Ok(self.db.products().get_by_id(product_id).await?)
    }
}
