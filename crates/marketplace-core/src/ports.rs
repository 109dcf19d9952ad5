//! # Storage Ports
//!
//! The contracts the order workflows consume. Adapters live elsewhere:
//! SQLite in `marketplace-db`, in-memory in `marketplace-orders`.
//!
//! ## Transaction Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderStore::begin() ──► Box<dyn OrderTransaction>                      │
//! │                               │                                         │
//! │                               ├── create(NewOrder)        → Order       │
//! │                               ├── update_quantity(&[...]) → ()          │
//! │                               └── commit()                              │
//! │                                                                         │
//! │  Dropping the transaction without commit() rolls everything back, so   │
//! │  an order is never stored without its stock decrement (or vice versa). │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{Customer, NewOrder, Order, Product, StockUpdate};

/// Resolves customers by id.
#[async_trait]
pub trait CustomerLookup: Send + Sync {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Customer>>;
}

/// Batch product reads.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// Returns the products whose id is in `ids`. Unknown ids are skipped;
    /// no ordering is guaranteed.
    async fn find_all_by_id(&self, ids: &[String]) -> StoreResult<Vec<Product>>;
}

/// Order persistence.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Opens a unit of work spanning order creation and stock updates.
    async fn begin(&self) -> StoreResult<Box<dyn OrderTransaction>>;

    /// Loads an order with its lines.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Order>>;
}

/// Writes performed atomically while placing one order.
#[async_trait]
pub trait OrderTransaction: Send {
    /// Persists the order and its lines, assigning identifiers.
    ///
    /// The returned `order_products` reflect what was stored.
    async fn create(&mut self, order: NewOrder) -> StoreResult<Order>;

    /// Overwrites each named product's stock with `quantity`.
    ///
    /// Every update is conditional on the stored value still equal to
    /// `expected`; a mismatch (or unknown product) is reported as
    /// [`StoreError::StockConflict`](crate::error::StoreError::StockConflict).
    async fn update_quantity(&mut self, updates: &[StockUpdate]) -> StoreResult<()>;

    /// Makes all writes of this transaction visible.
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
