//! # Port Adapters
//!
//! Implements the storage ports of `marketplace-core` on top of SQLite.
//!
//! ## Transaction Handling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SqliteOrderStore::begin()                                              │
//! │       │  pool.begin() → BEGIN                                           │
//! │       ▼                                                                 │
//! │  SqliteOrderTransaction { tx }                                          │
//! │       ├── create()          → INSERT orders, orders_products            │
//! │       ├── update_quantity() → UPDATE products ... AND quantity = ?      │
//! │       └── commit()          → COMMIT                                    │
//! │                                                                         │
//! │  Dropped without commit() → ROLLBACK                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::DbError;
use crate::repository::customer::CustomerRepository;
use crate::repository::order::{insert_order, OrderRepository};
use crate::repository::product::{apply_stock_updates, ProductRepository};
use marketplace_core::ports::{CustomerLookup, OrderStore, OrderTransaction, ProductLookup};
use marketplace_core::{Customer, NewOrder, Order, Product, StockUpdate, StoreResult};

#[async_trait]
impl CustomerLookup for CustomerRepository {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Customer>> {
        Ok(self.get_by_id(id).await?)
    }
}

#[async_trait]
impl ProductLookup for ProductRepository {
    async fn find_all_by_id(&self, ids: &[String]) -> StoreResult<Vec<Product>> {
        Ok(ProductRepository::find_all_by_id(self, ids).await?)
    }
}

/// Order store backed by the SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteOrderStore {
    pool: SqlitePool,
}

impl SqliteOrderStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteOrderStore { pool }
    }
}

#[async_trait]
impl OrderStore for SqliteOrderStore {
    async fn begin(&self) -> StoreResult<Box<dyn OrderTransaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!("Order transaction started");
        Ok(Box::new(SqliteOrderTransaction { tx }))
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Order>> {
        Ok(OrderRepository::new(self.pool.clone()).get_by_id(id).await?)
    }
}

/// One open SQLite transaction for placing an order.
pub struct SqliteOrderTransaction {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl OrderTransaction for SqliteOrderTransaction {
    async fn create(&mut self, order: NewOrder) -> StoreResult<Order> {
        Ok(insert_order(&mut self.tx, order).await?)
    }

    async fn update_quantity(&mut self, updates: &[StockUpdate]) -> StoreResult<()> {
        Ok(apply_stock_updates(&mut self.tx, updates).await?)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!("Order transaction committed");
        Ok(())
    }
}
