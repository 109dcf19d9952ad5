//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Batch lookup by id (the order workflow's snapshot read)
//! - Registration and price changes
//! - Conditional stock overwrites inside the order transaction
//!
//! ## Stock Update Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  ❌ WRONG: Blind overwrite (loses concurrent orders)                │
//! │     UPDATE products SET quantity = 7 WHERE id = ?                  │
//! │                                                                     │
//! │  ✅ CORRECT: Compare-and-swap against the snapshot                 │
//! │     UPDATE products SET quantity = 7 WHERE id = ? AND quantity = 10│
//! │                                                                     │
//! │  Order A and order B both read quantity = 10.                      │
//! │  A commits first → quantity = 7.                                   │
//! │  B's update matches no row → StockConflict → B rolls back.         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use marketplace_core::validation::{validate_name, validate_price, validate_stock};
use marketplace_core::{Product, StockUpdate};

const PRODUCT_COLUMNS: &str = "id, name, price_cents, quantity, created_at, updated_at";

/// Repository for product database operations.
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
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets every product whose id is in `ids`.
    ///
    /// Unknown ids are skipped. Rows come back in no particular order.
    pub async fn find_all_by_id(&self, ids: &[String]) -> DbResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        debug!(count = ids.len(), "Fetching products by id");

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id IN ("));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.clone());
        }
        separated.push_unseparated(")");

        let products = builder
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        debug!(found = products.len(), "Products fetched");
        Ok(products)
    }

    /// Lists products sorted by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name LIMIT ?1");
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Registers a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product with generated id
    /// * `Err(DbError::UniqueViolation)` - Name already exists
    /// * `Err(DbError::Invalid)` - Blank name, negative price or stock
    pub async fn insert(&self, name: &str, price_cents: i64, quantity: i64) -> DbResult<Product> {
        validate_name("name", name)?;
        validate_price(price_cents)?;
        validate_stock(quantity)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            price_cents,
            quantity,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, price_cents, quantity, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.quantity)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&product.name))?;

        Ok(product)
    }

    /// Changes a product's price.
    ///
    /// Lines of orders already placed keep the price they were placed at.
    pub async fn update_price(&self, id: &str, price_cents: i64) -> DbResult<()> {
        validate_price(price_cents)?;
        debug!(id = %id, price_cents, "Updating price");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET price_cents = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(price_cents)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Applies conditional stock overwrites on an open connection.
///
/// Each update only matches while the row still holds `expected`; the first
/// update that matches nothing aborts with [`DbError::StockConflict`]. Called
/// with the order transaction's connection, so a conflict rolls back the
/// whole order.
pub(crate) async fn apply_stock_updates(
    conn: &mut SqliteConnection,
    updates: &[StockUpdate],
) -> DbResult<()> {
    let now = Utc::now();

    for update in updates {
        debug!(
            id = %update.product_id,
            expected = update.expected,
            quantity = update.quantity,
            "Updating stock"
        );

        let result = sqlx::query(
            r#"
            UPDATE products
            SET quantity = ?2, updated_at = ?4
            WHERE id = ?1 AND quantity = ?3
            "#,
        )
        .bind(&update.product_id)
        .bind(update.quantity)
        .bind(update.expected)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::StockConflict {
                product_id: update.product_id.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_insert_and_find_all_by_id() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let widget = repo.insert("Widget", 500, 10).await.unwrap();
        let gadget = repo.insert("Gadget", 1250, 3).await.unwrap();

        let ids = vec![gadget.id.clone(), "missing".to_string(), widget.id.clone()];
        let mut found = repo.find_all_by_id(&ids).await.unwrap();
        found.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, gadget.id);
        assert_eq!(found[1].id, widget.id);
        assert_eq!(found[1].price_cents, 500);
        assert_eq!(found[1].quantity, 10);
    }

    #[tokio::test]
    async fn test_find_all_by_id_empty_input() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.products().find_all_by_id(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_negative_price_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db.products().insert("Widget", -1, 10).await.unwrap_err();
        assert!(matches!(err, DbError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert("Widget", 500, 10).await.unwrap();
        let err = repo.insert("Widget", 700, 1).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_price_unknown_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db.products().update_price("missing", 100).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_stock_update_applies_when_expected_matches() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let widget = db.products().insert("Widget", 500, 10).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let updates = [StockUpdate {
            product_id: widget.id.clone(),
            expected: 10,
            quantity: 7,
        }];
        apply_stock_updates(&mut conn, &updates).await.unwrap();
        drop(conn);

        let stored = db.products().get_by_id(&widget.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 7);
    }

    #[tokio::test]
    async fn test_stale_stock_update_is_a_conflict() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let widget = db.products().insert("Widget", 500, 10).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let updates = [StockUpdate {
            product_id: widget.id.clone(),
            expected: 9,
            quantity: 6,
        }];
        let err = apply_stock_updates(&mut conn, &updates).await.unwrap_err();
        drop(conn);

        assert!(matches!(err, DbError::StockConflict { .. }));
        let stored = db.products().get_by_id(&widget.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 10);
    }
}
