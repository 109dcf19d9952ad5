//! # Order Repository
//!
//! Database operations for orders and their lines.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE (inside the order transaction)                              │
//! │     └── insert_order(&mut conn, NewOrder) → Order                      │
//! │         ├── INSERT INTO orders                                          │
//! │         └── INSERT INTO orders_products (one row per line, position)   │
//! │                                                                         │
//! │  2. DECREMENT STOCK (same transaction, see product.rs)                 │
//! │                                                                         │
//! │  3. COMMIT or ROLLBACK                                                 │
//! │     └── Nothing of a rolled back order is visible afterwards           │
//! │                                                                         │
//! │  4. READ                                                               │
//! │     └── get_by_id() → Order { customer, order_products }               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Orders are never updated or deleted once placed.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::customer::CustomerRepository;
use marketplace_core::{NewOrder, Order, OrderProduct};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    customer_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
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

    /// Gets an order with its customer and lines.
    ///
    /// Lines come back in the order they were inserted.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, customer_id, created_at, updated_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let customer = CustomerRepository::new(self.pool.clone())
            .get_by_id(&row.customer_id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", row.customer_id.clone()))?;

        let order_products = self.get_lines(&row.id).await?;

        Ok(Some(Order {
            id: row.id,
            customer,
            order_products,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }

    /// Gets the lines of an order, in insertion order.
    pub async fn get_lines(&self, order_id: &str) -> DbResult<Vec<OrderProduct>> {
        let lines = sqlx::query_as::<_, OrderProduct>(
            r#"
            SELECT id, order_id, product_id, price_cents, quantity, created_at
            FROM orders_products
            WHERE order_id = ?1
            ORDER BY position
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Counts orders (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Inserts an order and its lines on an open connection.
///
/// Ids and timestamps are generated here. Meant to run on the order
/// transaction's connection.
pub(crate) async fn insert_order(conn: &mut SqliteConnection, order: NewOrder) -> DbResult<Order> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    debug!(id = %id, customer_id = %order.customer.id, lines = order.products.len(), "Inserting order");

    sqlx::query(
        r#"
        INSERT INTO orders (id, customer_id, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&id)
    .bind(&order.customer.id)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    let mut order_products = Vec::with_capacity(order.products.len());

    for (position, line) in order.products.into_iter().enumerate() {
        let line = OrderProduct {
            id: Uuid::new_v4().to_string(),
            order_id: id.clone(),
            product_id: line.product_id,
            price_cents: line.price_cents,
            quantity: line.quantity,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO orders_products (
                id, order_id, product_id, price_cents, quantity, position,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&line.id)
        .bind(&line.order_id)
        .bind(&line.product_id)
        .bind(line.price_cents)
        .bind(line.quantity)
        .bind(position as i64)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        order_products.push(line);
    }

    Ok(Order {
        id,
        customer: order.customer,
        order_products,
        created_at: now,
        updated_at: now,
    })
}
