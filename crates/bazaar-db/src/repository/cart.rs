//! # Cart Repository
//!
//! Persists one snapshot row per owner. The row holds the items as JSON; the
//! total is never stored and is recomputed by `Cart::from_items` on load.

use chrono::Utc;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::{Cart, CartItem};

/// Raw `carts` row.
#[derive(Debug, FromRow)]
struct CartRow {
    owner_id: String,
    items: String,
}

impl CartRow {
    fn into_cart(self) -> DbResult<Cart> {
        let items: Vec<CartItem> = serde_json::from_str(&self.items)?;
        Ok(Cart::from_items(self.owner_id, items))
    }
}

/// Repository for cart snapshots.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Inserts or replaces the snapshot for `cart.owner_id()`.
    ///
    /// Called with the working copy before it is committed in memory, so a
    /// failure here leaves the in-memory cart untouched.
    pub async fn upsert(&self, cart: &Cart) -> DbResult<()> {
        let items = serde_json::to_string(cart.items())?;
        let now = Utc::now();

        debug!(
            owner_id = %cart.owner_id(),
            lines = cart.item_count(),
            "Persisting cart snapshot"
        );

        sqlx::query(
            r#"
            INSERT INTO carts (owner_id, items, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(owner_id) DO UPDATE SET
                items = excluded.items,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(cart.owner_id())
        .bind(items)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Loads every stored cart (startup restore).
    pub async fn load_all(&self) -> DbResult<Vec<Cart>> {
        let rows = sqlx::query_as::<_, CartRow>(
            "SELECT owner_id, items FROM carts ORDER BY owner_id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CartRow::into_cart).collect()
    }
}
