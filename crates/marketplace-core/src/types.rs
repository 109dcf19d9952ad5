//! # Domain Types
//!
//! Core domain types of order placement.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │     Product     │   │      Order      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  name           │   │  customer       │       │
//! │  │  email          │   │  price_cents    │   │  order_products │       │
//! │  └─────────────────┘   │  quantity       │   └────────┬────────┘       │
//! │                        └─────────────────┘            │ 1..n           │
//! │                                               ┌───────▼─────────┐       │
//! │  Request side (never persisted):              │  OrderProduct   │       │
//! │  PlaceOrderRequest { customer_id,             │  product_id     │       │
//! │                      products: [line] }       │  quantity       │       │
//! │  OrderLineRequest  { id, quantity }           │  price_cents ❄  │       │
//! │                                               └─────────────────┘       │
//! │  ❄ = snapshot of the product price at placement, never updated         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Customer
// =============================================================================

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Contact email, unique across customers.
    pub email: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, unique across products.
    pub name: String,

    /// Unit price in cents.
    pub price_cents: i64,

    /// Units in stock. Never negative.
    pub quantity: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether `quantity` units can be taken from stock.
    #[inline]
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }
}

// =============================================================================
// Order Requests
// =============================================================================

/// One requested line: which product and how many units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLineRequest {
    /// Product id.
    pub id: String,

    /// Requested units, must be positive.
    pub quantity: i64,
}

impl OrderLineRequest {
    pub fn new(id: impl Into<String>, quantity: i64) -> Self {
        OrderLineRequest {
            id: id.into(),
            quantity,
        }
    }
}

/// Input of the place-order workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlaceOrderRequest {
    pub customer_id: String,
    pub products: Vec<OrderLineRequest>,
}

// =============================================================================
// Orders
// =============================================================================

/// A persisted order line.
/// Uses snapshot pattern to freeze the product price at time of placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderProduct {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Unit price in cents at time of placement (frozen).
    pub price_cents: i64,
    pub quantity: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderProduct {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price() * self.quantity
    }
}

/// A placed order with its lines as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub customer: Customer,
    /// Lines as persisted. Ordering may differ from the request.
    pub order_products: Vec<OrderProduct>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Sum of all line totals.
    pub fn total(&self) -> Money {
        self.order_products.iter().map(OrderProduct::line_total).sum()
    }
}

// =============================================================================
// Store Inputs
// =============================================================================

/// A line handed to the order store; ids are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub product_id: String,
    pub quantity: i64,
    pub price_cents: i64,
}

/// An order handed to the order store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer: Customer,
    pub products: Vec<NewOrderLine>,
}

/// Conditional stock overwrite.
///
/// The store sets the product's stock to `quantity` only if it still reads
/// `expected`; otherwise it reports a stock conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockUpdate {
    pub product_id: String,
    pub expected: i64,
    pub quantity: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: &str, price_cents: i64, quantity: i64) -> OrderProduct {
        OrderProduct {
            id: format!("line-{product_id}"),
            order_id: "O1".to_string(),
            product_id: product_id.to_string(),
            price_cents,
            quantity,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_order_total() {
        let now = Utc::now();
        let order = Order {
            id: "O1".to_string(),
            customer: Customer {
                id: "C1".to_string(),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                created_at: now,
                updated_at: now,
            },
            order_products: vec![line("P1", 500, 3), line("P2", 1250, 2)],
            created_at: now,
            updated_at: now,
        };

        assert_eq!(order.total().cents(), 4000);
    }

    #[test]
    fn test_has_stock_for() {
        let now = Utc::now();
        let product = Product {
            id: "P1".to_string(),
            name: "Widget".to_string(),
            price_cents: 500,
            quantity: 2,
            created_at: now,
            updated_at: now,
        };

        assert!(product.has_stock_for(2));
        assert!(!product.has_stock_for(3));
    }

    #[test]
    fn test_request_deserializes_from_json() {
        let json = r#"{"customer_id":"C1","products":[{"id":"P1","quantity":3}]}"#;
        let request: PlaceOrderRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.customer_id, "C1");
        assert_eq!(request.products, vec![OrderLineRequest::new("P1", 3)]);
    }
}
