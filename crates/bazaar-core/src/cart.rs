//! # Cart Aggregate
//!
//! A per-owner collection of line items with a derived total.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operation                 Effect on items            Effect on total   │
//! │  ─────────                 ───────────────            ───────────────   │
//! │                                                                         │
//! │  add_item(p, n, price) ──► qty += n  or  push(p)  ──► recomputed        │
//! │                                                                         │
//! │  update_quantity(p, n) ──► qty  = n  (0 removes)  ──► recomputed        │
//! │                                                                         │
//! │  remove_item(p) ─────────► retain(≠ p)  (no-op ok) ──► recomputed        │
//! │                                                                         │
//! │  clear() ────────────────► items = []              ──► 0                 │
//! │                                                                         │
//! │  NOTE: `total` is private. It can only change through the operations  │
//! │        above, each of which ends with `recompute_total()`.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Locking and persistence are not this module's business; the cart store in
//! the API crate owns both and calls into these pure methods.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{self, Money};
use crate::validation::{
    validate_new_quantity, validate_product_id, validate_quantity, validate_unit_price,
};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Item
// =============================================================================

/// A line in a cart, and the snapshot form of a line in an order.
///
/// ## Price Freezing
/// `unit_price` is captured when the line is first added. Adding more of the
/// same product increases `quantity` but keeps the original price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartItem {
    /// Opaque product identifier from the catalog.
    pub product_id: String,

    /// Quantity, always >= 1 while the line exists.
    pub quantity: i64,

    /// Unit price in cents at the time the line was added.
    #[serde(alias = "price")]
    pub unit_price: Money,
}

impl CartItem {
    /// Creates a line item.
    pub fn new(product_id: impl Into<String>, quantity: i64, unit_price: Money) -> Self {
        CartItem {
            product_id: product_id.into(),
            quantity,
            unit_price,
        }
    }

    /// Calculates the line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        money::line_total(self.quantity, self.unit_price)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart of one owner.
///
/// ## Invariants
/// - Items are unique by `product_id` (adding the same product increases quantity)
/// - Every item has quantity >= 1 (setting it to 0 removes the line)
/// - `total == Σ quantity × unit_price`, recomputed after every mutation
/// - At most `MAX_CART_ITEMS` lines, at most `MAX_ITEM_QUANTITY` per line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    owner_id: String,
    items: Vec<CartItem>,
    total: Money,
}

impl Cart {
    /// Creates a new empty cart for `owner_id`.
    pub fn new(owner_id: impl Into<String>) -> Self {
        Cart {
            owner_id: owner_id.into(),
            items: Vec::new(),
            total: Money::zero(),
        }
    }

    /// Rebuilds a cart from stored items.
    ///
    /// The total is recomputed rather than trusted, and lines with a
    /// non-positive quantity are dropped.
    pub fn from_items(owner_id: impl Into<String>, items: Vec<CartItem>) -> Self {
        let mut cart = Cart {
            owner_id: owner_id.into(),
            items,
            total: Money::zero(),
        };
        cart.items.retain(|i| i.quantity > 0);
        cart.recompute_total();
        cart
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Cached total of all lines.
    pub fn total(&self) -> Money {
        self.total
    }

    /// Returns the line for `product_id`, if any.
    pub fn find(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Returns the number of distinct lines in the cart.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds a product to the cart or increases its quantity if already present.
    ///
    /// ## Behavior
    /// - Product already in cart: quantity is additive, price unchanged
    /// - Product not in cart: appended as a new line
    ///
    /// ## Errors
    /// - `Validation` for an empty product id, non-positive or oversized
    ///   quantity, or a price outside `0..=MAX_UNIT_PRICE`
    /// - `QuantityTooLarge` if the merged quantity would exceed the maximum
    /// - `CartTooLarge` if a new line would exceed the line limit
    ///
    /// On error the cart is unchanged.
    pub fn add_item(&mut self, product_id: &str, quantity: i64, unit_price: Money) -> CoreResult<()> {
        validate_product_id(product_id)?;
        validate_quantity(quantity)?;
        validate_unit_price(unit_price)?;

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            let new_qty = item.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            item.quantity = new_qty;
        } else {
            if self.items.len() >= MAX_CART_ITEMS {
                return Err(CoreError::CartTooLarge {
                    max: MAX_CART_ITEMS,
                });
            }
            self.items
                .push(CartItem::new(product_id, quantity, unit_price));
        }

        self.recompute_total();
        Ok(())
    }

    /// Removes the line for `product_id`.
    ///
    /// Removing an absent product is a successful no-op; the return value
    /// reports whether a line was actually removed.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let initial_len = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.recompute_total();
        self.items.len() != initial_len
    }

    /// Sets the quantity of an existing line (absolute, not additive).
    ///
    /// ## Behavior
    /// - Quantity 0: removes the line
    /// - Product not in cart: `CartItemNotFound`, nothing is created
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        validate_new_quantity(quantity)?;

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) else {
            return Err(CoreError::CartItemNotFound {
                owner_id: self.owner_id.clone(),
                product_id: product_id.to_string(),
            });
        };

        if quantity == 0 {
            self.items.retain(|i| i.product_id != product_id);
        } else {
            item.quantity = quantity;
        }

        self.recompute_total();
        Ok(())
    }

    /// Clears all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.recompute_total();
    }

    fn recompute_total(&mut self) {
        self.total = money::items_total(&self.items);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ValidationError, MAX_UNIT_PRICE};

    fn price(cents: i64) -> Money {
        Money::from_cents(cents)
    }

    fn assert_total_consistent(cart: &Cart) {
        let expected: i64 = cart
            .items()
            .iter()
            .map(|i| i.quantity * i.unit_price.cents())
            .sum();
        assert_eq!(cart.total().cents(), expected);
        assert!(cart.items().iter().all(|i| i.quantity >= 1));
    }

    #[test]
    fn test_new_cart_is_empty() {
        let cart = Cart::new("u1");
        assert_eq!(cart.owner_id(), "u1");
        assert!(cart.is_empty());
        assert!(cart.total().is_zero());
    }

    #[test]
    fn test_add_is_additive() {
        let mut cart = Cart::new("u1");

        cart.add_item("p1", 2, price(100)).unwrap();
        assert_eq!(cart.items(), &[CartItem::new("p1", 2, price(100))]);
        assert_eq!(cart.total().cents(), 200);

        cart.add_item("p1", 3, price(100)).unwrap();
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
        assert_eq!(cart.total().cents(), 500);
    }

    #[test]
    fn test_add_keeps_first_price() {
        let mut cart = Cart::new("u1");
        cart.add_item("p1", 1, price(100)).unwrap();
        cart.add_item("p1", 1, price(150)).unwrap();

        assert_eq!(cart.find("p1").unwrap().unit_price, price(100));
        assert_eq!(cart.total().cents(), 200);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut cart = Cart::new("u1");
        cart.add_item("p2", 1, price(10)).unwrap();
        cart.add_item("p1", 1, price(20)).unwrap();
        cart.add_item("p2", 1, price(10)).unwrap();

        let ids: Vec<&str> = cart.items().iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1"]);
    }

    #[test]
    fn test_add_rejects_bad_input_without_side_effect() {
        let mut cart = Cart::new("u1");
        cart.add_item("p1", 1, price(100)).unwrap();
        let before = cart.clone();

        assert!(matches!(
            cart.add_item("p1", 0, price(100)),
            Err(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));
        assert!(cart.add_item("p1", -3, price(100)).is_err());
        assert!(cart.add_item("p2", 1, price(-1)).is_err());
        assert!(cart.add_item("", 1, price(1)).is_err());

        assert_eq!(cart, before);
    }

    #[test]
    fn test_add_quantity_limit() {
        let mut cart = Cart::new("u1");
        cart.add_item("p1", MAX_ITEM_QUANTITY, price(1)).unwrap();

        let err = cart.add_item("p1", 1, price(1)).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { requested: 1000, .. }));
        assert_eq!(cart.items()[0].quantity, MAX_ITEM_QUANTITY);
    }

    #[test]
    fn test_add_rejects_oversized_price() {
        let mut cart = Cart::new("u1");
        cart.add_item("p1", 1, price(100)).unwrap();
        let before = cart.clone();

        assert!(matches!(
            cart.add_item("p2", 2, price(i64::MAX / 2 + 1)),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_largest_cart_total_fits() {
        let mut cart = Cart::new("u1");
        for n in 0..MAX_CART_ITEMS {
            cart.add_item(&format!("p{n}"), MAX_ITEM_QUANTITY, price(MAX_UNIT_PRICE))
                .unwrap();
        }

        assert_total_consistent(&cart);
        assert_eq!(
            cart.total().cents(),
            MAX_CART_ITEMS as i64 * MAX_ITEM_QUANTITY * MAX_UNIT_PRICE
        );
    }

    #[test]
    fn test_add_line_limit() {
        let mut cart = Cart::new("u1");
        for n in 0..MAX_CART_ITEMS {
            cart.add_item(&format!("p{n}"), 1, price(1)).unwrap();
        }

        let err = cart.add_item("one-too-many", 1, price(1)).unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { .. }));

        // Existing lines can still grow.
        cart.add_item("p0", 1, price(1)).unwrap();
        assert_eq!(cart.item_count(), MAX_CART_ITEMS);
    }

    #[test]
    fn test_update_sets_absolute_quantity() {
        let mut cart = Cart::new("u1");
        cart.add_item("p1", 5, price(100)).unwrap();

        cart.update_quantity("p1", 1).unwrap();
        assert_eq!(cart.items(), &[CartItem::new("p1", 1, price(100))]);
        assert_eq!(cart.total().cents(), 100);
    }

    #[test]
    fn test_update_zero_removes_line() {
        let mut cart = Cart::new("u1");
        cart.add_item("p1", 5, price(100)).unwrap();
        cart.add_item("p2", 1, price(7)).unwrap();

        cart.update_quantity("p1", 0).unwrap();
        assert!(cart.find("p1").is_none());
        assert_eq!(cart.total().cents(), 7);
    }

    #[test]
    fn test_update_absent_item_is_not_found_and_creates_nothing() {
        let mut cart = Cart::new("u1");
        cart.add_item("p1", 1, price(100)).unwrap();

        let err = cart.update_quantity("p9", 4).unwrap_err();
        assert!(matches!(err, CoreError::CartItemNotFound { .. }));
        assert!(cart.find("p9").is_none());
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_update_rejects_negative_and_oversized() {
        let mut cart = Cart::new("u1");
        cart.add_item("p1", 2, price(100)).unwrap();

        assert!(matches!(
            cart.update_quantity("p1", -1),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            cart.update_quantity("p1", MAX_ITEM_QUANTITY + 1),
            Err(CoreError::QuantityTooLarge { .. })
        ));
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new("u1");
        cart.add_item("p1", 2, price(100)).unwrap();

        assert!(cart.remove_item("p1"));
        assert!(cart.is_empty());
        assert!(cart.total().is_zero());

        assert!(!cart.remove_item("p1"));
        assert!(cart.is_empty());
        assert!(cart.total().is_zero());
    }

    #[test]
    fn test_add_then_remove_round_trips() {
        let mut cart = Cart::new("u1");
        cart.add_item("p1", 2, price(100)).unwrap();
        let before = cart.clone();

        cart.add_item("p2", 3, price(250)).unwrap();
        cart.remove_item("p2");

        assert_eq!(cart, before);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut cart = Cart::new("u1");
        cart.add_item("p1", 2, price(100)).unwrap();

        cart.clear();
        let first = cart.clone();
        cart.clear();

        assert_eq!(cart, first);
        assert!(cart.is_empty());
        assert!(cart.total().is_zero());
    }

    #[test]
    fn test_total_invariant_over_mixed_sequence() {
        let mut cart = Cart::new("u1");
        let ops: Vec<Box<dyn Fn(&mut Cart)>> = vec![
            Box::new(|c: &mut Cart| c.add_item("a", 3, price(199)).unwrap()),
            Box::new(|c: &mut Cart| c.add_item("b", 1, price(2500)).unwrap()),
            Box::new(|c: &mut Cart| c.add_item("a", 4, price(199)).unwrap()),
            Box::new(|c: &mut Cart| c.update_quantity("b", 6).unwrap()),
            Box::new(|c: &mut Cart| {
                c.remove_item("zzz");
            }),
            Box::new(|c: &mut Cart| c.add_item("c", 1, Money::zero()).unwrap()),
            Box::new(|c: &mut Cart| c.update_quantity("a", 0).unwrap()),
            Box::new(|c: &mut Cart| {
                let _ = c.update_quantity("missing", 2);
            }),
            Box::new(|c: &mut Cart| {
                c.remove_item("b");
            }),
        ];

        for op in ops {
            op(&mut cart);
            assert_total_consistent(&cart);
        }
        assert_eq!(cart.items(), &[CartItem::new("c", 1, Money::zero())]);
    }

    #[test]
    fn test_from_items_recomputes_total() {
        let cart = Cart::from_items(
            "u1",
            vec![
                CartItem::new("p1", 2, price(100)),
                CartItem::new("ghost", 0, price(999)),
            ],
        );
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total().cents(), 200);
    }

    #[test]
    fn test_serialized_shape() {
        let mut cart = Cart::new("u1");
        cart.add_item("p1", 2, price(100)).unwrap();

        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "ownerId": "u1",
                "items": [{ "productId": "p1", "quantity": 2, "unitPrice": 100 }],
                "total": 200
            })
        );
    }
}
