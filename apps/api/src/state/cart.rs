//! # Cart Store
//!
//! Keyed collection of per-owner carts.
//!
//! ## Locking
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Locking                                   │
//! │                                                                         │
//! │  RwLock<HashMap<owner_id, Arc<Mutex<Option<Cart>>>>>                    │
//! │       │                                                                 │
//! │       │  map lock: held only to find, insert or drop a slot            │
//! │       ▼                                                                 │
//! │  ┌──────────┐  ┌──────────┐  ┌──────────┐                               │
//! │  │ u1 slot  │  │ u2 slot  │  │ u3 slot  │   one Mutex per owner         │
//! │  └────┬─────┘  └──────────┘  └──────────┘                               │
//! │       │                                                                 │
//! │       │  slot lock: held for the whole mutation                        │
//! │       ▼                                                                 │
//! │  clone ──► apply (bazaar-core) ──► persist (optional) ──► commit        │
//! │                                                                         │
//! │  Same owner:       mutations serialize, none are lost                  │
//! │  Different owners: mutations run in parallel                           │
//! │  Failed step:      slot keeps its previous cart                        │
//! │  Failed first write: the empty slot is dropped from the map            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use bazaar_core::validation::{
    validate_owner_id, validate_product_id, validate_quantity, validate_unit_price,
};
use bazaar_core::{Cart, CoreError, CoreResult, Money, StockPolicy};
use bazaar_db::Database;

use super::catalog::Catalog;
use super::StoreResult;

/// `None` until the first successful write for the owner.
type CartSlot = Arc<Mutex<Option<Cart>>>;

/// Per-owner carts with optional write-through persistence.
pub struct CartStore {
    carts: RwLock<HashMap<String, CartSlot>>,
    catalog: Arc<dyn Catalog>,
    stock_policy: StockPolicy,
    db: Option<Database>,
}

impl CartStore {
    /// Creates an empty store.
    pub fn new(catalog: Arc<dyn Catalog>, stock_policy: StockPolicy, db: Option<Database>) -> Self {
        CartStore {
            carts: RwLock::new(HashMap::new()),
            catalog,
            stock_policy,
            db,
        }
    }

    /// Seeds the store with previously persisted carts.
    pub async fn restore(&self, carts: Vec<Cart>) {
        let mut map = self.carts.write().await;
        for cart in carts {
            map.insert(cart.owner_id().to_string(), Arc::new(Mutex::new(Some(cart))));
        }
    }

    /// Number of owners with a cart record.
    pub async fn len(&self) -> usize {
        self.carts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.carts.read().await.is_empty()
    }

    async fn slot(&self, owner_id: &str) -> Option<CartSlot> {
        self.carts.read().await.get(owner_id).cloned()
    }

    async fn slot_or_create(&self, owner_id: &str) -> CartSlot {
        if let Some(slot) = self.slot(owner_id).await {
            return slot;
        }

        let mut map = self.carts.write().await;
        map.entry(owner_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone()
    }

    /// True while `slot` is still the one registered for `owner_id`.
    async fn is_current(&self, owner_id: &str, slot: &CartSlot) -> bool {
        self.carts
            .read()
            .await
            .get(owner_id)
            .is_some_and(|s| Arc::ptr_eq(s, slot))
    }

    async fn discard(&self, owner_id: &str, slot: &CartSlot) {
        let mut map = self.carts.write().await;
        if map.get(owner_id).is_some_and(|s| Arc::ptr_eq(s, slot)) {
            map.remove(owner_id);
        }
    }

    /// Runs one read-modify-persist-commit cycle under the slot lock.
    ///
    /// With `create` an absent cart starts out empty; without it the owner
    /// must already have a record. A slot that never committed is dropped
    /// again when its first write fails, and a caller that finds its slot
    /// dropped retries against the current one.
    async fn mutate<F>(&self, owner_id: &str, create: bool, apply: F) -> StoreResult<Cart>
    where
        F: Fn(&mut Cart) -> CoreResult<()>,
    {
        loop {
            let slot = if create {
                self.slot_or_create(owner_id).await
            } else {
                self.slot(owner_id)
                    .await
                    .ok_or_else(|| CoreError::CartNotFound(owner_id.to_string()))?
            };

            let mut current = slot.lock().await;
            if !self.is_current(owner_id, &slot).await {
                continue;
            }

            let mut working = match current.as_ref() {
                Some(cart) => cart.clone(),
                None if create => Cart::new(owner_id),
                None => return Err(CoreError::CartNotFound(owner_id.to_string()).into()),
            };

            let written = match apply(&mut working) {
                Ok(()) => self.persist(&working).await,
                Err(err) => Err(err.into()),
            };

            return match written {
                Ok(()) => {
                    *current = Some(working.clone());
                    Ok(working)
                }
                Err(err) => {
                    if current.is_none() {
                        self.discard(owner_id, &slot).await;
                    }
                    Err(err)
                }
            };
        }
    }

    async fn persist(&self, cart: &Cart) -> StoreResult<()> {
        if let Some(db) = &self.db {
            db.carts().upsert(cart).await?;
        }
        Ok(())
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Returns the owner's cart, or a fresh empty one.
    ///
    /// Never creates a record.
    pub async fn get(&self, owner_id: &str) -> Cart {
        match self.slot(owner_id).await {
            Some(slot) => slot
                .lock()
                .await
                .clone()
                .unwrap_or_else(|| Cart::new(owner_id)),
            None => Cart::new(owner_id),
        }
    }

    /// Adds `quantity` of a product at `unit_price`.
    ///
    /// Creates the cart on first use. A rejected or unpersisted first add
    /// leaves no record behind.
    pub async fn add(
        &self,
        owner_id: &str,
        product_id: &str,
        quantity: i64,
        unit_price: Money,
    ) -> StoreResult<Cart> {
        validate_owner_id(owner_id).map_err(CoreError::from)?;
        validate_product_id(product_id).map_err(CoreError::from)?;
        validate_quantity(quantity).map_err(CoreError::from)?;
        validate_unit_price(unit_price).map_err(CoreError::from)?;

        let cart = self
            .mutate(owner_id, true, |cart| {
                cart.add_item(product_id, quantity, unit_price)
            })
            .await?;

        debug!(
            owner_id = %owner_id,
            product_id = %product_id,
            quantity,
            total = %cart.total(),
            "Added to cart"
        );
        Ok(cart)
    }

    /// Adds a product, resolving its price through the catalog if the caller
    /// did not supply one, and applying the stock policy.
    ///
    /// ## Errors
    /// - `ProductNotFound` if a lookup was needed and the catalog has no entry
    /// - `ProductUnavailable` under `StockPolicy::RequireAvailable` when the
    ///   catalog marks the product unavailable
    pub async fn add_priced(
        &self,
        owner_id: &str,
        product_id: &str,
        quantity: i64,
        unit_price: Option<Money>,
    ) -> StoreResult<Cart> {
        if let (Some(price), StockPolicy::Ignore) = (unit_price, self.stock_policy) {
            return self.add(owner_id, product_id, quantity, price).await;
        }

        validate_product_id(product_id).map_err(CoreError::from)?;

        let entry = self
            .catalog
            .lookup(product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        if !self.stock_policy.admits(&entry) {
            debug!(product_id = %product_id, "Rejected unavailable product");
            return Err(CoreError::ProductUnavailable(product_id.to_string()).into());
        }

        let price = unit_price.unwrap_or(entry.unit_price);
        self.add(owner_id, product_id, quantity, price).await
    }

    /// Removes a product line. Removing an absent product succeeds.
    ///
    /// ## Errors
    /// - `Validation` for an empty owner or product id
    /// - `CartNotFound` if the owner has no cart record
    pub async fn remove(&self, owner_id: &str, product_id: &str) -> StoreResult<Cart> {
        validate_owner_id(owner_id).map_err(CoreError::from)?;
        validate_product_id(product_id).map_err(CoreError::from)?;

        let cart = self
            .mutate(owner_id, false, |cart| {
                cart.remove_item(product_id);
                Ok(())
            })
            .await?;

        debug!(owner_id = %owner_id, product_id = %product_id, "Removed from cart");
        Ok(cart)
    }

    /// Sets a line's quantity; zero removes the line.
    ///
    /// ## Errors
    /// - `Validation` for an empty owner or product id
    /// - `CartNotFound` if the owner has no cart record
    /// - `CartItemNotFound` if the product is not in the cart
    pub async fn update(&self, owner_id: &str, product_id: &str, quantity: i64) -> StoreResult<Cart> {
        validate_owner_id(owner_id).map_err(CoreError::from)?;
        validate_product_id(product_id).map_err(CoreError::from)?;

        let cart = self
            .mutate(owner_id, false, |cart| cart.update_quantity(product_id, quantity))
            .await?;

        debug!(owner_id = %owner_id, product_id = %product_id, quantity, "Updated cart line");
        Ok(cart)
    }

    /// Empties the owner's cart, creating the record if needed.
    pub async fn clear(&self, owner_id: &str) -> StoreResult<Cart> {
        validate_owner_id(owner_id).map_err(CoreError::from)?;

        let cart = self
            .mutate(owner_id, true, |cart| {
                cart.clear();
                Ok(())
            })
            .await?;

        debug!(owner_id = %owner_id, "Cleared cart");
        Ok(cart)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::catalog::StaticCatalog;
    use crate::state::StoreError;
    use bazaar_core::{CartItem, CatalogEntry};
    use bazaar_db::DbConfig;

    fn cents(c: i64) -> Money {
        Money::from_cents(c)
    }

    fn catalog() -> Arc<dyn Catalog> {
        Arc::new(StaticCatalog::with_entries([
            CatalogEntry {
                product_id: "lamp".to_string(),
                name: "Desk Lamp".to_string(),
                unit_price: cents(2499),
                available: true,
            },
            CatalogEntry {
                product_id: "sold-out".to_string(),
                name: "Vintage Radio".to_string(),
                unit_price: cents(8900),
                available: false,
            },
        ]))
    }

    fn store() -> CartStore {
        CartStore::new(catalog(), StockPolicy::Ignore, None)
    }

    #[tokio::test]
    async fn test_get_unknown_owner_creates_nothing() {
        let store = store();

        let cart = store.get("u1").await;
        assert!(cart.is_empty());
        assert!(cart.total().is_zero());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_add_then_update_then_remove() {
        let store = store();

        let cart = store.add("u1", "p1", 2, cents(100)).await.unwrap();
        assert_eq!(cart.total().cents(), 200);

        let cart = store.add("u1", "p1", 3, cents(100)).await.unwrap();
        assert_eq!(cart.items(), &[CartItem::new("p1", 5, cents(100))]);
        assert_eq!(cart.total().cents(), 500);

        let cart = store.update("u1", "p1", 1).await.unwrap();
        assert_eq!(cart.total().cents(), 100);

        let cart = store.remove("u1", "p1").await.unwrap();
        assert!(cart.is_empty());

        let again = store.remove("u1", "p1").await.unwrap();
        assert_eq!(again, cart);
    }

    #[tokio::test]
    async fn test_remove_and_update_without_cart() {
        let store = store();

        assert!(matches!(
            store.remove("u1", "p1").await,
            Err(StoreError::Core(CoreError::CartNotFound(_)))
        ));
        assert!(matches!(
            store.update("u1", "p1", 2).await,
            Err(StoreError::Core(CoreError::CartNotFound(_)))
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_absent_item() {
        let store = store();
        store.add("u1", "p1", 1, cents(100)).await.unwrap();

        assert!(matches!(
            store.update("u1", "p9", 2).await,
            Err(StoreError::Core(CoreError::CartItemNotFound { .. }))
        ));
        assert!(store.get("u1").await.find("p9").is_none());
    }

    #[tokio::test]
    async fn test_rejected_add_leaves_no_record() {
        let store = store();

        assert!(store.add("u1", "p1", 0, cents(100)).await.is_err());
        assert!(store.add("u1", "p1", 1, cents(-5)).await.is_err());
        assert!(store.add("u1", "p1", 2, cents(i64::MAX / 2 + 1)).await.is_err());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove_and_update_require_product_id() {
        let store = store();
        store.add("u1", "p1", 1, cents(100)).await.unwrap();
        let before = store.get("u1").await;

        assert!(matches!(
            store.remove("u1", "").await,
            Err(StoreError::Core(CoreError::Validation(_)))
        ));
        assert!(matches!(
            store.update("u1", "  ", 2).await,
            Err(StoreError::Core(CoreError::Validation(_)))
        ));
        assert_eq!(store.get("u1").await, before);
    }

    #[tokio::test]
    async fn test_clear_creates_and_is_idempotent() {
        let store = store();

        let cart = store.clear("u1").await.unwrap();
        assert!(cart.is_empty());
        assert_eq!(store.len().await, 1);

        store.add("u1", "p1", 4, cents(50)).await.unwrap();
        let first = store.clear("u1").await.unwrap();
        let second = store.clear("u1").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_add_priced_uses_catalog_price() {
        let store = store();

        let cart = store.add_priced("u1", "lamp", 2, None).await.unwrap();
        assert_eq!(cart.items(), &[CartItem::new("lamp", 2, cents(2499))]);

        let cart = store.add_priced("u1", "other", 1, Some(cents(10))).await.unwrap();
        assert_eq!(cart.total().cents(), 2 * 2499 + 10);
    }

    #[tokio::test]
    async fn test_add_priced_unknown_product() {
        let store = store();

        assert!(matches!(
            store.add_priced("u1", "ghost", 1, None).await,
            Err(StoreError::Core(CoreError::ProductNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_stock_policy() {
        let ignoring = store();
        assert!(ignoring.add_priced("u1", "sold-out", 1, None).await.is_ok());

        let strict = CartStore::new(catalog(), StockPolicy::RequireAvailable, None);
        assert!(matches!(
            strict.add_priced("u1", "sold-out", 1, Some(cents(1))).await,
            Err(StoreError::Core(CoreError::ProductUnavailable(_)))
        ));
        assert!(strict.add_priced("u1", "lamp", 1, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_adds_are_not_lost() {
        let store = Arc::new(store());

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.add("u1", "p1", 1, cents(100)).await })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let cart = store.get("u1").await;
        assert_eq!(cart.items()[0].quantity, 50);
        assert_eq!(cart.total().cents(), 5000);
    }

    #[tokio::test]
    async fn test_owners_are_independent() {
        let store = store();

        store.add("u1", "p1", 1, cents(100)).await.unwrap();
        store.add("u2", "p2", 3, cents(10)).await.unwrap();
        store.clear("u1").await.unwrap();

        assert!(store.get("u1").await.is_empty());
        assert_eq!(store.get("u2").await.total().cents(), 30);
    }

    #[tokio::test]
    async fn test_write_through_and_restore() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = CartStore::new(catalog(), StockPolicy::Ignore, Some(db.clone()));

        store.add("u1", "p1", 2, cents(100)).await.unwrap();
        store.add("u1", "p2", 1, cents(50)).await.unwrap();
        store.remove("u1", "p2").await.unwrap();

        let rebuilt = CartStore::new(catalog(), StockPolicy::Ignore, Some(db.clone()));
        rebuilt.restore(db.carts().load_all().await.unwrap()).await;

        assert_eq!(rebuilt.get("u1").await, store.get("u1").await);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cart_unchanged() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = CartStore::new(catalog(), StockPolicy::Ignore, Some(db.clone()));

        store.add("u1", "p1", 2, cents(100)).await.unwrap();
        let before = store.get("u1").await;

        db.close().await;

        assert!(matches!(
            store.add("u1", "p1", 1, cents(100)).await,
            Err(StoreError::Db(_))
        ));
        assert_eq!(store.get("u1").await, before);
    }

    #[tokio::test]
    async fn test_failed_first_write_leaves_no_record() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = CartStore::new(catalog(), StockPolicy::Ignore, Some(db.clone()));

        db.close().await;

        assert!(matches!(
            store.add("u1", "p1", 1, cents(100)).await,
            Err(StoreError::Db(_))
        ));
        assert!(matches!(store.clear("u2").await, Err(StoreError::Db(_))));
        assert!(store.is_empty().await);

        assert!(matches!(
            store.remove("u1", "p1").await,
            Err(StoreError::Core(CoreError::CartNotFound(_)))
        ));
        assert!(matches!(
            store.update("u1", "p1", 2).await,
            Err(StoreError::Core(CoreError::CartNotFound(_)))
        ));
        assert!(store.get("u1").await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_failed_first_writes_leave_no_record() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = Arc::new(CartStore::new(catalog(), StockPolicy::Ignore, Some(db.clone())));

        db.close().await;

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.add("u1", "p1", 1, cents(100)).await })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap().is_err());
        }
        assert!(store.is_empty().await);
    }
}
