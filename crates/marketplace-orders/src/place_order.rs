//! # Place Order
//!
//! The order placement workflow.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PlaceOrderRequest { customer_id, products }                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. customers.find_by_id ─────────────── None → CustomerNotFound       │
//! │  2. validate_request ─────────────────── []   → EmptyOrder             │
//! │  3. products.find_all_by_id(distinct ids)                              │
//! │  4. plan_order(lines, snapshot) ──────── ProductsNotFound              │
//! │       │                                  ProductNotFound(first miss)   │
//! │       │                                  InsufficientStock             │
//! │       ▼                                                                 │
//! │  ┌──────────── orders.begin() ─────────────────────────────┐           │
//! │  │ 5. tx.create(NewOrder)                                  │           │
//! │  │ 6. tx.update_quantity(stock_updates(snapshot, lines))   │ atomic    │
//! │  │       stored stock ≠ snapshot → StockConflict           │           │
//! │  │ 7. tx.commit()                                          │           │
//! │  └─────────────────────────────────────────────────────────┘           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Order (as persisted)                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Steps 1 to 4 never write. Any error ends the workflow; an open transaction
//! is dropped and rolls back.

use std::sync::Arc;

use tracing::{debug, info, warn};

use marketplace_core::placement::{plan_order, requested_ids, stock_updates, validate_request};
use marketplace_core::ports::{CustomerLookup, OrderStore, ProductLookup};
use marketplace_core::{NewOrder, Order, OrderError, OrderResult, PlaceOrderRequest};

/// Places orders against the injected ports.
#[derive(Clone)]
pub struct PlaceOrder {
    customers: Arc<dyn CustomerLookup>,
    products: Arc<dyn ProductLookup>,
    orders: Arc<dyn OrderStore>,
}

impl PlaceOrder {
    pub fn new(
        customers: Arc<dyn CustomerLookup>,
        products: Arc<dyn ProductLookup>,
        orders: Arc<dyn OrderStore>,
    ) -> Self {
        PlaceOrder {
            customers,
            products,
            orders,
        }
    }

    /// Validates the request, reserves stock and persists the order.
    ///
    /// ## Returns
    /// * `Ok(Order)` - The order as stored, with store-assigned ids
    /// * `Err(OrderError)` - The first failing check; nothing was written
    pub async fn execute(&self, request: PlaceOrderRequest) -> OrderResult<Order> {
        let customer_id = request.customer_id.clone();

        match self.place(request).await {
            Ok(order) => {
                info!(
                    order_id = %order.id,
                    customer_id = %customer_id,
                    lines = order.order_products.len(),
                    total = %order.total(),
                    "Order placed"
                );
                Ok(order)
            }
            Err(err) => {
                warn!(customer_id = %customer_id, error = %err, "Order rejected");
                Err(err)
            }
        }
    }

    async fn place(&self, request: PlaceOrderRequest) -> OrderResult<Order> {
        let PlaceOrderRequest {
            customer_id,
            products: lines,
        } = request;

        debug!(customer_id = %customer_id, lines = lines.len(), "Placing order");

        let customer = self
            .customers
            .find_by_id(&customer_id)
            .await?
            .ok_or(OrderError::CustomerNotFound(customer_id))?;

        validate_request(&lines)?;

        let ids = requested_ids(&lines);
        let snapshot = self.products.find_all_by_id(&ids).await?;
        debug!(requested = ids.len(), found = snapshot.len(), "Product snapshot read");

        let planned = plan_order(&lines, &snapshot)?;

        let mut tx = self.orders.begin().await?;
        let order = tx
            .create(NewOrder {
                customer,
                products: planned,
            })
            .await?;

        let updates = stock_updates(&snapshot, &order.order_products)?;
        tx.update_quantity(&updates).await?;
        tx.commit().await?;

        Ok(order)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;

    use crate::memory::InMemoryStore;
    use marketplace_core::ports::OrderTransaction;
    use marketplace_core::{Customer, OrderLineRequest, Product, StoreResult};

    fn customer(id: &str) -> Customer {
        Customer {
            id: id.to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn product(id: &str, price_cents: i64, quantity: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            price_cents,
            quantity,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request(customer_id: &str, lines: &[(&str, i64)]) -> PlaceOrderRequest {
        PlaceOrderRequest {
            customer_id: customer_id.to_string(),
            products: lines
                .iter()
                .map(|(id, quantity)| OrderLineRequest::new(*id, *quantity))
                .collect(),
        }
    }

    /// Counts product lookups.
    struct CountingProducts {
        inner: InMemoryStore,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ProductLookup for CountingProducts {
        async fn find_all_by_id(&self, ids: &[String]) -> StoreResult<Vec<Product>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_all_by_id(ids).await
        }
    }

    /// Counts transactions opened.
    struct CountingOrders {
        inner: InMemoryStore,
        begins: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl OrderStore for CountingOrders {
        async fn begin(&self) -> StoreResult<Box<dyn OrderTransaction>> {
            self.begins.fetch_add(1, Ordering::SeqCst);
            self.inner.begin().await
        }

        async fn find_by_id(&self, id: &str) -> StoreResult<Option<Order>> {
            OrderStore::find_by_id(&self.inner, id).await
        }
    }

    /// Reads the snapshot, then lets another writer take stock before the
    /// order commits.
    struct RacingProducts {
        inner: InMemoryStore,
        product_id: String,
        quantity_after_read: i64,
    }

    #[async_trait]
    impl ProductLookup for RacingProducts {
        async fn find_all_by_id(&self, ids: &[String]) -> StoreResult<Vec<Product>> {
            let snapshot = self.inner.find_all_by_id(ids).await?;
            self.inner
                .set_quantity(&self.product_id, self.quantity_after_read)
                .await?;
            Ok(snapshot)
        }
    }

    struct Harness {
        store: InMemoryStore,
        product_calls: Arc<AtomicUsize>,
        begins: Arc<AtomicUsize>,
        workflow: PlaceOrder,
    }

    async fn harness(products: &[Product]) -> Harness {
        let store = InMemoryStore::new();
        store.put_customer(customer("C1")).await;
        for product in products {
            store.put_product(product.clone()).await;
        }

        let product_calls = Arc::new(AtomicUsize::new(0));
        let begins = Arc::new(AtomicUsize::new(0));

        let workflow = PlaceOrder::new(
            Arc::new(store.clone()),
            Arc::new(CountingProducts {
                inner: store.clone(),
                calls: product_calls.clone(),
            }),
            Arc::new(CountingOrders {
                inner: store.clone(),
                begins: begins.clone(),
            }),
        );

        Harness {
            store,
            product_calls,
            begins,
            workflow,
        }
    }

    #[tokio::test]
    async fn test_places_order_and_decrements_stock() {
        let h = harness(&[product("P1", 500, 10)]).await;

        let order = h.workflow.execute(request("C1", &[("P1", 3)])).await.unwrap();

        assert_eq!(order.customer.id, "C1");
        assert_eq!(order.order_products.len(), 1);
        let line = &order.order_products[0];
        assert_eq!(line.product_id, "P1");
        assert_eq!(line.quantity, 3);
        assert_eq!(line.price_cents, 500);
        assert_eq!(line.order_id, order.id);
        assert_eq!(order.total().cents(), 1500);

        assert_eq!(h.store.product("P1").await.unwrap().quantity, 7);
        assert_eq!(h.store.order_count().await, 1);
    }

    #[tokio::test]
    async fn test_multiple_products() {
        let h = harness(&[product("P1", 500, 10), product("P2", 1250, 4)]).await;

        let order = h
            .workflow
            .execute(request("C1", &[("P2", 4), ("P1", 1)]))
            .await
            .unwrap();

        assert_eq!(order.total().cents(), 5500);
        assert_eq!(h.store.product("P1").await.unwrap().quantity, 9);
        assert_eq!(h.store.product("P2").await.unwrap().quantity, 0);
    }

    #[tokio::test]
    async fn test_unknown_customer_touches_nothing_else() {
        let h = harness(&[product("P1", 500, 10)]).await;

        let err = h
            .workflow
            .execute(request("C404", &[("P1", 1)]))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::CustomerNotFound(ref id) if id == "C404"));
        assert_eq!(h.product_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.begins.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_order_rejected_before_product_lookup() {
        let h = harness(&[product("P1", 500, 10)]).await;

        let err = h.workflow.execute(request("C1", &[])).await.unwrap_err();

        assert!(matches!(err, OrderError::EmptyOrder));
        assert_eq!(h.product_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_positive_quantity_rejected() {
        let h = harness(&[product("P1", 500, 10)]).await;

        let err = h
            .workflow
            .execute(request("C1", &[("P1", 0)]))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::Validation(_)));
        assert_eq!(h.product_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_product_resolves() {
        let h = harness(&[product("P1", 500, 10)]).await;

        let err = h
            .workflow
            .execute(request("C1", &[("P8", 1), ("P9", 1)]))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::ProductsNotFound));
        assert_eq!(h.begins.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reports_first_missing_product() {
        let h = harness(&[product("P1", 500, 10)]).await;

        let err = h
            .workflow
            .execute(request("C1", &[("P1", 1), ("P9", 1), ("P8", 1)]))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::ProductNotFound(ref id) if id == "P9"));
        assert_eq!(h.store.order_count().await, 0);
        assert_eq!(h.store.product("P1").await.unwrap().quantity, 10);
    }

    #[tokio::test]
    async fn test_insufficient_stock_opens_no_transaction() {
        let h = harness(&[product("P1", 500, 2)]).await;

        let err = h
            .workflow
            .execute(request("C1", &[("P1", 5)]))
            .await
            .unwrap_err();

        match err {
            OrderError::InsufficientStock {
                product_id,
                available,
                requested,
            } => {
                assert_eq!(product_id, "P1");
                assert_eq!(available, 2);
                assert_eq!(requested, 5);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(h.begins.load(Ordering::SeqCst), 0);
        assert_eq!(h.store.product("P1").await.unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn test_duplicate_lines_are_accumulated_for_the_check() {
        let h = harness(&[product("P1", 500, 5)]).await;

        let err = h
            .workflow
            .execute(request("C1", &[("P1", 3), ("P1", 3)]))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::InsufficientStock { requested: 6, .. }));
        assert_eq!(h.store.product("P1").await.unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn test_duplicate_lines_are_accumulated_for_the_decrement() {
        let h = harness(&[product("P1", 500, 5)]).await;

        let order = h
            .workflow
            .execute(request("C1", &[("P1", 2), ("P1", 3)]))
            .await
            .unwrap();

        assert_eq!(order.order_products.len(), 2);
        assert_eq!(h.store.product("P1").await.unwrap().quantity, 0);
    }

    #[tokio::test]
    async fn test_line_price_is_a_snapshot() {
        let h = harness(&[product("P1", 500, 10)]).await;

        let order = h.workflow.execute(request("C1", &[("P1", 1)])).await.unwrap();
        h.store.set_price("P1", 900).await.unwrap();

        let stored = OrderStore::find_by_id(&h.store, &order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.order_products[0].price_cents, 500);
    }

    #[tokio::test]
    async fn test_total_overflow_rejected_before_writing() {
        let h = harness(&[product("P1", i64::MAX / 2, 10)]).await;

        let err = h
            .workflow
            .execute(request("C1", &[("P1", 3)]))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::Validation(_)));
        assert_eq!(h.begins.load(Ordering::SeqCst), 0);
        assert_eq!(h.store.order_count().await, 0);
        assert_eq!(h.store.product("P1").await.unwrap().quantity, 10);
    }

    #[tokio::test]
    async fn test_concurrent_stock_change_is_a_conflict() {
        let store = InMemoryStore::new();
        store.put_customer(customer("C1")).await;
        store.put_product(product("P1", 500, 10)).await;

        let workflow = PlaceOrder::new(
            Arc::new(store.clone()),
            Arc::new(RacingProducts {
                inner: store.clone(),
                product_id: "P1".to_string(),
                quantity_after_read: 8,
            }),
            Arc::new(store.clone()),
        );

        let err = workflow
            .execute(request("C1", &[("P1", 3)]))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::StockConflict(ref id) if id == "P1"));
        assert_eq!(store.order_count().await, 0);
        assert_eq!(store.product("P1").await.unwrap().quantity, 8);
    }

    // -------------------------------------------------------------------------
    // SQLite adapters
    // -------------------------------------------------------------------------

    mod sqlite {
        use super::*;
        use marketplace_db::{Database, DbConfig};

        fn workflow(db: &Database) -> PlaceOrder {
            PlaceOrder::new(
                Arc::new(db.customers()),
                Arc::new(db.products()),
                Arc::new(db.order_store()),
            )
        }

        #[tokio::test]
        async fn test_places_order_end_to_end() {
            let db = Database::new(DbConfig::in_memory()).await.unwrap();
            let customer = db.customers().insert("Ada", "ada@example.com").await.unwrap();
            let widget = db.products().insert("Widget", 500, 10).await.unwrap();

            let order = workflow(&db)
                .execute(request(&customer.id, &[(widget.id.as_str(), 3)]))
                .await
                .unwrap();

            let stored = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
            assert_eq!(stored.order_products.len(), 1);
            assert_eq!(stored.order_products[0].price_cents, 500);
            assert_eq!(stored.total().cents(), 1500);

            let widget = db.products().get_by_id(&widget.id).await.unwrap().unwrap();
            assert_eq!(widget.quantity, 7);
        }

        #[tokio::test]
        async fn test_stored_line_keeps_price_after_repricing() {
            let db = Database::new(DbConfig::in_memory()).await.unwrap();
            let customer = db.customers().insert("Ada", "ada@example.com").await.unwrap();
            let widget = db.products().insert("Widget", 500, 10).await.unwrap();

            let order = workflow(&db)
                .execute(request(&customer.id, &[(widget.id.as_str(), 2)]))
                .await
                .unwrap();
            db.products().update_price(&widget.id, 900).await.unwrap();

            let repriced = db.products().get_by_id(&widget.id).await.unwrap().unwrap();
            assert_eq!(repriced.price_cents, 900);

            let stored = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
            assert_eq!(stored.order_products[0].price_cents, 500);
            assert_eq!(stored.total().cents(), 1000);
        }

        #[tokio::test]
        async fn test_missing_product_leaves_database_untouched() {
            let db = Database::new(DbConfig::in_memory()).await.unwrap();
            let customer = db.customers().insert("Ada", "ada@example.com").await.unwrap();
            let widget = db.products().insert("Widget", 500, 10).await.unwrap();

            let err = workflow(&db)
                .execute(request(&customer.id, &[(widget.id.as_str(), 1), ("P9", 1)]))
                .await
                .unwrap_err();

            assert!(matches!(err, OrderError::ProductNotFound(ref id) if id == "P9"));
            assert_eq!(db.orders().count().await.unwrap(), 0);
            let widget = db.products().get_by_id(&widget.id).await.unwrap().unwrap();
            assert_eq!(widget.quantity, 10);
        }
    }
}
