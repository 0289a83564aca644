//! # Order Aggregate
//!
//! A placed purchase: an immutable snapshot of line items plus a status that
//! moves through a fixed lifecycle.
//!
//! ## Status Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Order Status Transitions                           │
//! │                                                                         │
//! │   ┌─────────┐     ┌────────────┐     ┌─────────┐     ┌───────────┐      │
//! │   │ pending │────►│ processing │────►│ shipped │────►│ delivered │      │
//! │   └────┬────┘     └─────┬──────┘     └─────────┘     └───────────┘      │
//! │        │                │                                               │
//! │        │                ▼                                               │
//! │        │          ┌───────────┐                                         │
//! │        └─────────►│ cancelled │                                         │
//! │                   └───────────┘                                         │
//! │                                                                         │
//! │  delivered and cancelled are terminal.                                  │
//! │  StatusPolicy::Permissive accepts any target status.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Changes After Creation
//! Only `status` and `updated_at`. Items, total, shipping address and payment
//! method are fixed at `Order::place`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::cart::CartItem;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::{
    validate_order_total, validate_owner_id, validate_product_id, validate_quantity,
    validate_unit_price, ValidationResult,
};

// =============================================================================
// Order Status
// =============================================================================

/// The lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, not yet picked up.
    Pending,
    /// Being prepared.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Received by the customer.
    Delivered,
    /// Cancelled before shipping.
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Lowercase wire and database name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Statuses reachable in one step under the strict policy.
    pub const fn allowed_next(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Processing, OrderStatus::Cancelled],
            OrderStatus::Processing => &[OrderStatus::Shipped, OrderStatus::Cancelled],
            OrderStatus::Shipped => &[OrderStatus::Delivered],
            OrderStatus::Delivered | OrderStatus::Cancelled => &[],
        }
    }

    /// Checks the strict transition table.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::OrderStatus;
    ///
    /// assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Processing));
    /// assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
    /// assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Pending));
    /// ```
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_next().is_empty()
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Status Policy
// =============================================================================

/// How `Order::set_status` treats the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// Only transitions in the table are accepted.
    Strict,
    /// Any target status is accepted.
    Permissive,
}

impl StatusPolicy {
    pub fn allows(&self, from: OrderStatus, to: OrderStatus) -> bool {
        match self {
            StatusPolicy::Strict => from.can_transition_to(to),
            StatusPolicy::Permissive => true,
        }
    }
}

impl Default for StatusPolicy {
    fn default() -> Self {
        StatusPolicy::Strict
    }
}

// =============================================================================
// New Order
// =============================================================================

/// Input for placing an order.
///
/// `total` is caller supplied and stored as given; it is not recomputed
/// from `items`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewOrder {
    pub owner_id: String,
    pub items: Vec<CartItem>,
    pub total: Option<Money>,
    pub shipping_address: Option<Value>,
    pub payment_method: Option<Value>,
}

impl NewOrder {
    /// Checks every field and returns the validated total.
    ///
    /// ## Rules
    /// - `owner_id` non-empty
    /// - `items` non-empty, each line with a product id, quantity >= 1 and
    ///   a unit price within `0..=MAX_UNIT_PRICE`
    /// - `total` present and non-negative
    pub fn validate(&self) -> ValidationResult<Money> {
        validate_owner_id(&self.owner_id)?;

        if self.items.is_empty() {
            return Err(ValidationError::Required {
                field: "items".to_string(),
            });
        }

        for item in &self.items {
            validate_product_id(&item.product_id)?;
            validate_quantity(item.quantity)?;
            validate_unit_price(item.unit_price)?;
        }

        validate_order_total(self.total)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    id: String,
    owner_id: String,
    items: Vec<CartItem>,
    total: Money,
    #[ts(type = "unknown")]
    shipping_address: Option<Value>,
    #[ts(type = "unknown")]
    payment_method: Option<Value>,
    status: OrderStatus,
    #[ts(as = "String")]
    created_at: DateTime<Utc>,
    #[ts(as = "String")]
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Places a new order with status `pending`.
    ///
    /// `created_at` and `updated_at` are both set to `now`. The id is
    /// supplied by the caller (the order store generates UUID v4 ids).
    ///
    /// ## Errors
    /// `Validation` if `new` fails `NewOrder::validate`.
    pub fn place(id: impl Into<String>, new: NewOrder, now: DateTime<Utc>) -> CoreResult<Order> {
        let total = new.validate()?;

        Ok(Order {
            id: id.into(),
            owner_id: new.owner_id,
            items: new.items,
            total,
            shipping_address: new.shipping_address,
            payment_method: new.payment_method,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds an order from stored columns without re-validating.
    #[allow(clippy::too_many_arguments)]
    pub fn rehydrate(
        id: String,
        owner_id: String,
        items: Vec<CartItem>,
        total: Money,
        shipping_address: Option<Value>,
        payment_method: Option<Value>,
        status: OrderStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Order {
        Order {
            id,
            owner_id,
            items,
            total,
            shipping_address,
            payment_method,
            status,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// The line items as they were when the order was placed.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn shipping_address(&self) -> Option<&Value> {
        self.shipping_address.as_ref()
    }

    pub fn payment_method(&self) -> Option<&Value> {
        self.payment_method.as_ref()
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves the order to `next` and refreshes `updated_at`.
    ///
    /// `updated_at` always ends up strictly later than its previous value,
    /// even if the clock has not advanced since the last write.
    ///
    /// ## Errors
    /// `InvalidStatusTransition` if `policy` rejects the move. The order is
    /// unchanged in that case.
    pub fn set_status(
        &mut self,
        next: OrderStatus,
        policy: StatusPolicy,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        if !policy.allows(self.status, next) {
            return Err(CoreError::InvalidStatusTransition {
                order_id: self.id.clone(),
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }

        self.status = next;
        self.updated_at = later_of(self.updated_at, now);
        Ok(())
    }
}

/// `now`, or one microsecond after `previous` if the clock has not moved past it.
fn later_of(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let floor = previous + Duration::microseconds(1);
    if now > floor {
        now
    } else {
        floor
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
