//! # In-Memory Adapters
//!
//! Implements every storage port over a `HashMap` state, for tests and demos.
//!
//! ## Locking
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  InMemoryStore { state: Arc<Mutex<State>> }                             │
//! │                                                                         │
//! │  lookups ─────► lock, clone out, unlock                                │
//! │                                                                         │
//! │  begin() ─────► lock_owned() ──► MemoryTransaction {                   │
//! │                                     guard,    (held until commit/drop) │
//! │                                     staged,   (copy of the state)      │
//! │                                  }                                      │
//! │  create / update_quantity ──► staged only                              │
//! │  commit ──► *guard = staged                                            │
//! │  drop   ──► staged discarded, lock released                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! NOTE: A transaction holds the lock, so calling a lookup while one is open
//! on the same task waits forever.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

use marketplace_core::ports::{CustomerLookup, OrderStore, OrderTransaction, ProductLookup};
use marketplace_core::{
    Customer, NewOrder, Order, OrderProduct, Product, StockUpdate, StoreError, StoreResult,
};

#[derive(Debug, Clone, Default)]
struct State {
    customers: HashMap<String, Customer>,
    products: HashMap<String, Product>,
    orders: HashMap<String, Order>,
}

/// All ports backed by one shared in-memory state.
///
/// Cloning shares the state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a customer.
    pub async fn put_customer(&self, customer: Customer) {
        let mut state = self.state.lock().await;
        state.customers.insert(customer.id.clone(), customer);
    }

    /// Adds or replaces a product.
    pub async fn put_product(&self, product: Product) {
        let mut state = self.state.lock().await;
        state.products.insert(product.id.clone(), product);
    }

    /// Current state of a product.
    pub async fn product(&self, id: &str) -> Option<Product> {
        self.state.lock().await.products.get(id).cloned()
    }

    /// Changes a product's price.
    pub async fn set_price(&self, id: &str, price_cents: i64) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let product = state
            .products
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("Product", id))?;

        product.price_cents = price_cents;
        product.updated_at = Utc::now();
        Ok(())
    }

    /// Overwrites a product's stock outside of any order.
    pub async fn set_quantity(&self, id: &str, quantity: i64) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let product = state
            .products
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("Product", id))?;

        product.quantity = quantity;
        product.updated_at = Utc::now();
        Ok(())
    }

    /// Number of committed orders.
    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }
}

#[async_trait]
impl CustomerLookup for InMemoryStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Customer>> {
        Ok(self.state.lock().await.customers.get(id).cloned())
    }
}

#[async_trait]
impl ProductLookup for InMemoryStore {
    async fn find_all_by_id(&self, ids: &[String]) -> StoreResult<Vec<Product>> {
        let state = self.state.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn OrderTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();

        debug!("In-memory transaction started");
        Ok(Box::new(MemoryTransaction { guard, staged }))
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Order>> {
        Ok(self.state.lock().await.orders.get(id).cloned())
    }
}

/// Exclusive transaction over the in-memory state.
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<State>,
    staged: State,
}

#[async_trait]
impl OrderTransaction for MemoryTransaction {
    async fn create(&mut self, order: NewOrder) -> StoreResult<Order> {
        if !self.staged.customers.contains_key(&order.customer.id) {
            return Err(StoreError::not_found("Customer", order.customer.id));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut order_products = Vec::with_capacity(order.products.len());
        for line in order.products {
            if !self.staged.products.contains_key(&line.product_id) {
                return Err(StoreError::not_found("Product", line.product_id));
            }

            order_products.push(OrderProduct {
                id: Uuid::new_v4().to_string(),
                order_id: id.clone(),
                product_id: line.product_id,
                price_cents: line.price_cents,
                quantity: line.quantity,
                created_at: now,
            });
        }

        let order = Order {
            id: id.clone(),
            customer: order.customer,
            order_products,
            created_at: now,
            updated_at: now,
        };

        self.staged.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn update_quantity(&mut self, updates: &[StockUpdate]) -> StoreResult<()> {
        let now = Utc::now();

        for update in updates {
            match self.staged.products.get_mut(&update.product_id) {
                Some(product) if product.quantity == update.expected => {
                    product.quantity = update.quantity;
                    product.updated_at = now;
                }
                _ => return Err(StoreError::stock_conflict(update.product_id.clone())),
            }
        }

        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTransaction { mut guard, staged } = *self;
        *guard = staged;

        debug!("In-memory transaction committed");
        Ok(())
    }
}
