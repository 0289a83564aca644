//! # State Module
//!
//! The stores behind the HTTP surface, built once at startup and handed to
//! the router as its state.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      axum Router                                │   │
//! │  │  Router::new()...with_state(app_state)                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │  AppState (Clone, all Arc)               │
//! │          ┌──────────────────┼──────────────────┐                       │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐              │
//! │  │  CartStore   │  │  OrderStore  │  │  Option<Database>│              │
//! │  │              │  │              │  │                  │              │
//! │  │  owner ─►    │  │  OrderBook   │  │  write-through   │              │
//! │  │  Mutex<Cart> │  │  (append)    │  │  (sqlite mode)   │              │
//! │  └──────┬───────┘  └──────────────┘  └──────────────────┘              │
//! │         ▼                                                               │
//! │  ┌──────────────┐                                                       │
//! │  │ dyn Catalog  │                                                       │
//! │  └──────────────┘                                                       │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • CartStore: one mutex per owner, map lock only to find the slot      │
//! │  • OrderStore: one mutex per order, book lock only to find or append   │
//! │  • Database: internal connection pool                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod catalog;
mod order;

use std::sync::Arc;

use tracing::info;

use bazaar_core::{CoreError, StatusPolicy, StockPolicy};
use bazaar_db::{Database, DbError};

use crate::config::StorageMode;

pub use cart::CartStore;
pub use catalog::{Catalog, DbCatalog, StaticCatalog};
pub use order::OrderStore;

/// Failure of a store operation: either the domain rejected it or the
/// write-through to SQLite failed. In both cases memory is unchanged.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub carts: Arc<CartStore>,
    pub orders: Arc<OrderStore>,
    db: Option<Database>,
}

impl AppState {
    /// Memory-only state; nothing survives a restart.
    pub fn new(
        catalog: Arc<dyn Catalog>,
        stock_policy: StockPolicy,
        status_policy: StatusPolicy,
    ) -> Self {
        AppState {
            carts: Arc::new(CartStore::new(catalog, stock_policy, None)),
            orders: Arc::new(OrderStore::new(status_policy, None)),
            db: None,
        }
    }

    /// SQLite-backed state: restores carts and orders from `db`, then writes
    /// every mutation through to it. The catalog is the `products` table.
    pub async fn persistent(
        db: Database,
        stock_policy: StockPolicy,
        status_policy: StatusPolicy,
    ) -> StoreResult<Self> {
        let catalog: Arc<dyn Catalog> = Arc::new(DbCatalog::new(db.clone()));

        let carts = CartStore::new(catalog, stock_policy, Some(db.clone()));
        carts.restore(db.carts().load_all().await?).await;

        let orders = OrderStore::new(status_policy, Some(db.clone()));
        orders.restore(db.orders().load_all().await?).await;

        info!(
            carts = carts.len().await,
            orders = orders.len().await,
            "State restored from database"
        );

        Ok(AppState {
            carts: Arc::new(carts),
            orders: Arc::new(orders),
            db: Some(db),
        })
    }

    pub fn storage(&self) -> StorageMode {
        match self.db {
            Some(_) => StorageMode::Sqlite,
            None => StorageMode::Memory,
        }
    }

    pub fn database(&self) -> Option<&Database> {
        self.db.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::{CartItem, Money, NewOrder, OrderStatus};
    use bazaar_db::DbConfig;

    #[tokio::test]
    async fn test_in_memory_state() {
        let state = AppState::new(
            Arc::new(StaticCatalog::new()),
            StockPolicy::Ignore,
            StatusPolicy::Strict,
        );

        assert_eq!(state.storage(), StorageMode::Memory);
        assert!(state.database().is_none());
        assert!(state.carts.is_empty().await);
        assert!(state.orders.is_empty().await);
    }

    #[tokio::test]
    async fn test_persistent_state_survives_rebuild() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let state = AppState::persistent(db.clone(), StockPolicy::Ignore, StatusPolicy::Strict)
            .await
            .unwrap();
        assert_eq!(state.storage(), StorageMode::Sqlite);

        state
            .carts
            .add("u1", "p1", 2, Money::from_cents(100))
            .await
            .unwrap();
        let order = state
            .orders
            .create(NewOrder {
                owner_id: "u1".to_string(),
                items: vec![CartItem::new("p1", 2, Money::from_cents(100))],
                total: Some(Money::from_cents(200)),
                ..Default::default()
            })
            .await
            .unwrap();
        state
            .orders
            .update_status(order.id(), OrderStatus::Processing)
            .await
            .unwrap();

        let rebuilt = AppState::persistent(db, StockPolicy::Ignore, StatusPolicy::Strict)
            .await
            .unwrap();

        assert_eq!(rebuilt.carts.get("u1").await, state.carts.get("u1").await);
        assert_eq!(
            rebuilt.orders.get(order.id()).await.unwrap().status(),
            OrderStatus::Processing
        );
    }
}
