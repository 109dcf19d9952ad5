//! # Find Order
//!
//! Loads a placed order with its lines.

use std::sync::Arc;

use tracing::debug;

use marketplace_core::ports::OrderStore;
use marketplace_core::{Order, OrderError, OrderResult};

/// Order lookup by id.
#[derive(Clone)]
pub struct FindOrder {
    orders: Arc<dyn OrderStore>,
}

impl FindOrder {
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        FindOrder { orders }
    }

    /// Returns the order, or [`OrderError::OrderNotFound`].
    pub async fn execute(&self, order_id: &str) -> OrderResult<Order> {
        debug!(order_id = %order_id, "Finding order");

        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }
}
