//! # Order Store
//!
//! Append-only collection of orders with id lookup and an owner index.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RwLock<OrderBook>                                                      │
//! │                                                                         │
//! │   entries:  [ Arc<Mutex<o1>>, Arc<Mutex<o2>>, Arc<Mutex<o3>> ]          │
//! │                    ▲               ▲               ▲                    │
//! │   by_id:     o1 ───┘        o2 ────┘        o3 ────┘                    │
//! │   by_owner:  u1 ─► [0, 2]   u2 ─► [1]                                   │
//! │                                                                         │
//! │  create:        book write lock (append keeps creation order)          │
//! │  get / list:    book read lock, then each order's own lock             │
//! │  update_status: book read lock to find the slot, then only that        │
//! │                 order is locked for clone ─► apply ─► persist ─► commit│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use bazaar_core::{CoreError, NewOrder, Order, OrderList, OrderStatus, StatusPolicy};
use bazaar_db::Database;

use super::StoreResult;

type OrderSlot = Arc<Mutex<Order>>;

#[derive(Default)]
struct OrderBook {
    entries: Vec<OrderSlot>,
    by_id: HashMap<String, usize>,
    by_owner: HashMap<String, Vec<usize>>,
}

impl OrderBook {
    fn push(&mut self, order: Order) {
        let index = self.entries.len();
        self.by_id.insert(order.id().to_string(), index);
        self.by_owner
            .entry(order.owner_id().to_string())
            .or_default()
            .push(index);
        self.entries.push(Arc::new(Mutex::new(order)));
    }
}

/// Orders with optional write-through persistence.
pub struct OrderStore {
    book: RwLock<OrderBook>,
    status_policy: StatusPolicy,
    db: Option<Database>,
}

impl OrderStore {
    pub fn new(status_policy: StatusPolicy, db: Option<Database>) -> Self {
        OrderStore {
            book: RwLock::new(OrderBook::default()),
            status_policy,
            db,
        }
    }

    /// Seeds the store with previously persisted orders, in creation order.
    pub async fn restore(&self, orders: Vec<Order>) {
        let mut book = self.book.write().await;
        for order in orders {
            book.push(order);
        }
    }

    pub async fn len(&self) -> usize {
        self.book.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.book.read().await.entries.is_empty()
    }

    async fn snapshot(slots: Vec<OrderSlot>) -> Vec<Order> {
        let mut orders = Vec::with_capacity(slots.len());
        for slot in slots {
            orders.push(slot.lock().await.clone());
        }
        orders
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Places an order with a fresh UUID v4 id and status `pending`.
    ///
    /// ## Errors
    /// - `Validation` if `new` is incomplete; nothing is stored
    /// - `Db` if the write-through insert fails; nothing is stored
    pub async fn create(&self, new: NewOrder) -> StoreResult<Order> {
        let mut book = self.book.write().await;

        let order = Order::place(Uuid::new_v4().to_string(), new, Utc::now())?;

        if let Some(db) = &self.db {
            db.orders().insert(&order).await?;
        }

        book.push(order.clone());

        debug!(
            order_id = %order.id(),
            owner_id = %order.owner_id(),
            total = %order.total(),
            "Order created"
        );
        Ok(order)
    }

    /// Looks an order up by id.
    pub async fn get(&self, id: &str) -> StoreResult<Order> {
        let slot = {
            let book = self.book.read().await;
            book.by_id.get(id).map(|&i| book.entries[i].clone())
        };

        match slot {
            Some(slot) => Ok(slot.lock().await.clone()),
            None => Err(CoreError::OrderNotFound(id.to_string()).into()),
        }
    }

    /// All orders in creation order.
    pub async fn list_all(&self) -> OrderList {
        let slots = self.book.read().await.entries.clone();
        OrderList::from(Self::snapshot(slots).await)
    }

    /// One owner's orders in creation order.
    pub async fn list_by_owner(&self, owner_id: &str) -> OrderList {
        let slots: Vec<OrderSlot> = {
            let book = self.book.read().await;
            book.by_owner
                .get(owner_id)
                .map(|indexes| indexes.iter().map(|&i| book.entries[i].clone()).collect())
                .unwrap_or_default()
        };
        OrderList::from(Self::snapshot(slots).await)
    }

    /// Moves an order to `status` under the configured policy.
    ///
    /// ## Errors
    /// - `OrderNotFound` if the id is unknown (the collection is unchanged)
    /// - `InvalidStatusTransition` if the policy rejects the move
    /// - `Db` if the write-through update fails; the order keeps its status
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> StoreResult<Order> {
        let slot = {
            let book = self.book.read().await;
            book.by_id.get(id).map(|&i| book.entries[i].clone())
        }
        .ok_or_else(|| CoreError::OrderNotFound(id.to_string()))?;

        let mut current = slot.lock().await;

        let mut working = current.clone();
        working.set_status(status, self.status_policy, Utc::now())?;

        if let Some(db) = &self.db {
            db.orders().update_status(&working).await?;
        }

        *current = working.clone();

        debug!(order_id = %id, status = %status, "Order status updated");
        Ok(working)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StoreError;
    use bazaar_core::{Cart, CartItem, Money};
    use bazaar_db::DbConfig;
    use serde_json::json;

    fn new_order(owner: &str, items: Vec<CartItem>) -> NewOrder {
        let total = bazaar_core::money::items_total(&items);
        NewOrder {
            owner_id: owner.to_string(),
            items,
            total: Some(total),
            shipping_address: Some(json!({ "line1": "1 Main St" })),
            payment_method: Some(json!("card")),
        }
    }

    fn single(owner: &str) -> NewOrder {
        new_order(owner, vec![CartItem::new("p2", 1, Money::from_cents(9499))])
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = OrderStore::new(StatusPolicy::Strict, None);

        let order = store.create(single("u1")).await.unwrap();
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.created_at(), order.updated_at());
        assert!(Uuid::parse_str(order.id()).is_ok());

        assert_eq!(store.get(order.id()).await.unwrap(), order);
    }

    #[tokio::test]
    async fn test_create_invalid_stores_nothing() {
        let store = OrderStore::new(StatusPolicy::Strict, None);

        let mut no_total = single("u1");
        no_total.total = None;
        assert!(matches!(
            store.create(no_total).await,
            Err(StoreError::Core(CoreError::Validation(_)))
        ));
        assert!(store.create(new_order("u1", Vec::new())).await.is_err());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_order_is_a_snapshot_of_the_cart() {
        let store = OrderStore::new(StatusPolicy::Strict, None);

        let mut cart = Cart::new("u1");
        cart.add_item("p1", 2, Money::from_cents(100)).unwrap();

        let order = store
            .create(new_order("u1", cart.items().to_vec()))
            .await
            .unwrap();

        cart.add_item("p1", 5, Money::from_cents(100)).unwrap();
        cart.clear();

        let stored = store.get(order.id()).await.unwrap();
        assert_eq!(stored.items(), &[CartItem::new("p1", 2, Money::from_cents(100))]);
    }

    #[tokio::test]
    async fn test_listing() {
        let store = OrderStore::new(StatusPolicy::Strict, None);

        let a = store.create(single("u1")).await.unwrap();
        let b = store.create(single("u2")).await.unwrap();
        let c = store.create(single("u1")).await.unwrap();

        let all = store.list_all().await;
        assert_eq!(all.total, 3);
        let ids: Vec<&str> = all.orders.iter().map(|o| o.id()).collect();
        assert_eq!(ids, vec![a.id(), b.id(), c.id()]);

        let mine = store.list_by_owner("u1").await;
        assert_eq!(mine.total, 2);
        assert_eq!(mine.orders[0].id(), a.id());
        assert_eq!(mine.orders[1].id(), c.id());

        let none = store.list_by_owner("u3").await;
        assert_eq!(none.total, 0);
        assert!(none.orders.is_empty());
    }

    #[tokio::test]
    async fn test_update_status_unknown_id() {
        let store = OrderStore::new(StatusPolicy::Permissive, None);
        store.create(single("u1")).await.unwrap();

        assert!(matches!(
            store.update_status("missing", OrderStatus::Shipped).await,
            Err(StoreError::Core(CoreError::OrderNotFound(_)))
        ));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_strict_policy() {
        let store = OrderStore::new(StatusPolicy::Strict, None);
        let order = store.create(single("u1")).await.unwrap();

        assert!(matches!(
            store.update_status(order.id(), OrderStatus::Shipped).await,
            Err(StoreError::Core(CoreError::InvalidStatusTransition { .. }))
        ));
        assert_eq!(store.get(order.id()).await.unwrap(), order);

        let processing = store
            .update_status(order.id(), OrderStatus::Processing)
            .await
            .unwrap();
        let shipped = store
            .update_status(order.id(), OrderStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(shipped.status(), OrderStatus::Shipped);
        assert!(shipped.updated_at() > processing.updated_at());
        assert!(processing.updated_at() > order.created_at());
    }

    #[tokio::test]
    async fn test_permissive_policy() {
        let store = OrderStore::new(StatusPolicy::Permissive, None);
        let order = store.create(single("u1")).await.unwrap();

        let shipped = store
            .update_status(order.id(), OrderStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(shipped.status(), OrderStatus::Shipped);
        assert!(shipped.updated_at() > shipped.created_at());
    }

    #[tokio::test]
    async fn test_concurrent_creates() {
        let store = Arc::new(OrderStore::new(StatusPolicy::Strict, None));

        let tasks: Vec<_> = (0..20)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move { store.create(single(&format!("u{}", n % 4))).await })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(store.list_all().await.total, 20);
        assert_eq!(store.list_by_owner("u0").await.total, 5);
    }

    #[tokio::test]
    async fn test_write_through_and_restore() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = OrderStore::new(StatusPolicy::Strict, Some(db.clone()));

        let first = store.create(single("u1")).await.unwrap();
        store.create(single("u2")).await.unwrap();
        store
            .update_status(first.id(), OrderStatus::Cancelled)
            .await
            .unwrap();

        let rebuilt = OrderStore::new(StatusPolicy::Strict, Some(db.clone()));
        rebuilt.restore(db.orders().load_all().await.unwrap()).await;

        assert_eq!(rebuilt.list_all().await, store.list_all().await);
        assert_eq!(
            rebuilt.get(first.id()).await.unwrap().status(),
            OrderStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn test_failed_create_stores_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = OrderStore::new(StatusPolicy::Strict, Some(db.clone()));

        let kept = store.create(single("u1")).await.unwrap();
        db.close().await;

        assert!(matches!(
            store.create(single("u1")).await,
            Err(StoreError::Db(_))
        ));
        assert_eq!(store.len().await, 1);

        let mine = store.list_by_owner("u1").await;
        assert_eq!(mine.total, 1);
        assert_eq!(mine.orders[0], kept);
    }

    #[tokio::test]
    async fn test_failed_status_write_leaves_order_unchanged() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = OrderStore::new(StatusPolicy::Strict, Some(db.clone()));

        let order = store.create(single("u1")).await.unwrap();
        db.close().await;

        assert!(matches!(
            store.update_status(order.id(), OrderStatus::Processing).await,
            Err(StoreError::Db(_))
        ));

        let stored = store.get(order.id()).await.unwrap();
        assert_eq!(stored, order);
        assert_eq!(stored.status(), OrderStatus::Pending);
        assert_eq!(stored.updated_at(), order.updated_at());
    }
}
