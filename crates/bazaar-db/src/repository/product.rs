//! # Product Repository
//!
//! Catalog lookups for add-to-cart pricing.
//!
//! The engine only reads this table. `upsert` exists for the seed binary and
//! for tests; catalog management lives outside this system.

use chrono::Utc;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::{CatalogEntry, Money};

/// Raw `products` row.
#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    name: String,
    price_cents: i64,
    available: bool,
}

impl From<ProductRow> for CatalogEntry {
    fn from(row: ProductRow) -> Self {
        CatalogEntry {
            product_id: row.id,
            name: row.name,
            unit_price: Money::from_cents(row.price_cents),
            available: row.available,
        }
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// if let Some(entry) = repo.get_by_id("p1").await? {
///     println!("{} costs {}", entry.name, entry.unit_price);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(CatalogEntry))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CatalogEntry>> {
        debug!(product_id = %id, "Looking up product");

        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, price_cents, available FROM products WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CatalogEntry::from))
    }

    /// Lists products sorted by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<CatalogEntry>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, price_cents, available FROM products ORDER BY name LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CatalogEntry::from).collect())
    }

    /// Inserts a product or overwrites its name, price and availability.
    pub async fn upsert(&self, entry: &CatalogEntry) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO products (id, name, price_cents, available, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                price_cents = excluded.price_cents,
                available = excluded.available,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&entry.product_id)
        .bind(&entry.name)
        .bind(entry.unit_price.cents())
        .bind(entry.available)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use bazaar_core::{CatalogEntry, Money};

    fn lamp(price: i64, available: bool) -> CatalogEntry {
        CatalogEntry {
            product_id: "lamp-01".to_string(),
            name: "Desk Lamp".to_string(),
            unit_price: Money::from_cents(price),
            available,
        }
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.products().upsert(&lamp(2499, true)).await.unwrap();
        assert_eq!(
            db.products().get_by_id("lamp-01").await.unwrap(),
            Some(lamp(2499, true))
        );

        db.products().upsert(&lamp(1999, false)).await.unwrap();
        assert_eq!(
            db.products().get_by_id("lamp-01").await.unwrap(),
            Some(lamp(1999, false))
        );
        assert_eq!(db.products().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.products().get_by_id("nope").await.unwrap().is_none());
        assert!(db.products().list(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_negative_price_rejected_by_schema() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db.products().upsert(&lamp(-1, true)).await.unwrap_err();
        assert!(matches!(err, DbError::QueryFailed(_)));
    }
}
