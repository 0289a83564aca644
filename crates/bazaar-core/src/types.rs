//! # Shared Types
//!
//! Types that cross the boundary between the stores and their collaborators.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::order::Order;

// =============================================================================
// Catalog Entry
// =============================================================================

/// Price and availability of a product, as the catalog reports it.
///
/// The cart takes `unit_price` at face value; freshness is the catalog's
/// responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CatalogEntry {
    pub product_id: String,
    pub name: String,
    pub unit_price: Money,
    pub available: bool,
}

// =============================================================================
// Stock Policy
// =============================================================================

/// Whether add-to-cart looks at catalog availability.
///
/// There is no reservation either way: `RequireAvailable` only rejects
/// products the catalog flags as unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockPolicy {
    Ignore,
    RequireAvailable,
}

impl StockPolicy {
    /// Checks a catalog entry against the policy.
    pub fn admits(&self, entry: &CatalogEntry) -> bool {
        match self {
            StockPolicy::Ignore => true,
            StockPolicy::RequireAvailable => entry.available,
        }
    }
}

impl Default for StockPolicy {
    fn default() -> Self {
        StockPolicy::Ignore
    }
}

// =============================================================================
// Order List
// =============================================================================

/// A list of orders with its length, in creation order.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct OrderList {
    pub total: usize,
    pub orders: Vec<Order>,
}

impl From<Vec<Order>> for OrderList {
    fn from(orders: Vec<Order>) -> Self {
        OrderList {
            total: orders.len(),
            orders,
        }
    }
}
