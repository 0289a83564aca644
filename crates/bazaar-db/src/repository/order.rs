//! # Order Repository
//!
//! Database operations for orders.
//!
//! ## Write Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    What Gets Written When                               │
//! │                                                                         │
//! │  OrderStore::create ──► insert(&order)         one row, all columns    │
//! │                                                                         │
//! │  OrderStore::update_status ──► update_status(&order)                   │
//! │                                 status + updated_at only               │
//! │                                                                         │
//! │  items / total / shipping_address / payment_method never change after  │
//! │  the insert.                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use bazaar_core::{CartItem, Money, Order, OrderStatus};

const SELECT_ORDER: &str = r#"
    SELECT
        id,
        owner_id,
        items,
        total_cents,
        shipping_address,
        payment_method,
        status,
        created_at,
        updated_at
    FROM orders
"#;

/// Raw `orders` row.
#[derive(Debug, FromRow)]
struct OrderRow {
    id: String,
    owner_id: String,
    items: String,
    total_cents: i64,
    shipping_address: Option<String>,
    payment_method: Option<String>,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> DbResult<Order> {
        let items: Vec<CartItem> = serde_json::from_str(&self.items)?;
        let shipping_address = self
            .shipping_address
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        let payment_method = self
            .payment_method
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(Order::rehydrate(
            self.id,
            self.owner_id,
            items,
            Money::from_cents(self.total_cents),
            shipping_address,
            payment_method,
            self.status,
            self.created_at,
            self.updated_at,
        ))
    }
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts a newly placed order.
    ///
    /// ## Errors
    /// * `UniqueViolation` - An order with this id already exists
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        let items = serde_json::to_string(order.items())?;
        let shipping_address = order
            .shipping_address()
            .map(serde_json::to_string)
            .transpose()?;
        let payment_method = order
            .payment_method()
            .map(serde_json::to_string)
            .transpose()?;

        debug!(
            order_id = %order.id(),
            owner_id = %order.owner_id(),
            total = %order.total(),
            "Inserting order"
        );

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, owner_id, items, total_cents,
                shipping_address, payment_method,
                status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(order.id())
        .bind(order.owner_id())
        .bind(items)
        .bind(order.total().cents())
        .bind(shipping_address)
        .bind(payment_method)
        .bind(order.status())
        .bind(order.created_at())
        .bind(order.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Writes the status and `updated_at` of an existing order.
    ///
    /// ## Errors
    /// * `NotFound` - No row with `order.id()`
    pub async fn update_status(&self, order: &Order) -> DbResult<()> {
        debug!(
            order_id = %order.id(),
            status = %order.status(),
            "Updating order status"
        );

        let result = sqlx::query("UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(order.status())
            .bind(order.updated_at())
            .bind(order.id())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order.id()));
        }

        Ok(())
    }

    /// Loads every order in creation order (startup restore).
    pub async fn load_all(&self) -> DbResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{SELECT_ORDER} ORDER BY created_at, rowid"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Loaded orders");
        rows.into_iter().map(OrderRow::into_order).collect()
    }
}
