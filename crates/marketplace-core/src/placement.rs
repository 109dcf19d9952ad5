//! # Order Planning
//!
//! The pure half of order placement: everything that can be decided from the
//! request and a snapshot of the requested products, without touching storage.
//!
//! ## Where This Sits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PlaceOrder workflow (marketplace-orders)                               │
//! │                                                                         │
//! │  find customer ──► validate_request ──► find_all_by_id(requested_ids)  │
//! │                          ▲                        │                     │
//! │                          │                        ▼ snapshot            │
//! │                     THIS MODULE ◄──────────  plan_order                 │
//! │                          │                        │ NewOrderLine[]      │
//! │                          │                        ▼                     │
//! │                          │                   tx.create(order)           │
//! │                          │                        │ order_products      │
//! │                          └─────────────────► stock_updates              │
//! │                                                   │                     │
//! │                                                   ▼                     │
//! │                                     tx.update_quantity ──► tx.commit    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Duplicate Product Ids
//! A request may name the same product on several lines. Quantities are
//! accumulated per product before comparing against stock and before
//! computing the new stock level, so `[{P1, 3}, {P1, 3}]` against a stock of
//! 5 is rejected and `[{P1, 2}, {P1, 3}]` leaves 0.

use std::collections::HashMap;

use crate::error::{OrderError, OrderResult, ValidationError};
use crate::money::Money;
use crate::types::{NewOrderLine, OrderLineRequest, OrderProduct, Product, StockUpdate};
use crate::validation::validate_order_lines;

/// Rejects requests that cannot be planned at all.
///
/// Empty requests fail with [`OrderError::EmptyOrder`]; malformed lines
/// (blank id, non-positive or oversized quantity) with
/// [`OrderError::Validation`].
pub fn validate_request(lines: &[OrderLineRequest]) -> OrderResult<()> {
    if lines.is_empty() {
        return Err(OrderError::EmptyOrder);
    }

    validate_order_lines(lines)?;
    Ok(())
}

/// Distinct product ids of the request, in first-appearance order.
pub fn requested_ids(lines: &[OrderLineRequest]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        if !ids.iter().any(|id| id == &line.id) {
            ids.push(line.id.clone());
        }
    }
    ids
}

/// Checks the request against the product snapshot and prices every line.
///
/// ## Checks (in order, first failure wins)
/// 1. Snapshot empty → [`OrderError::ProductsNotFound`]
/// 2. Requested id missing from the snapshot → [`OrderError::ProductNotFound`]
///    naming the first missing id in request order
/// 3. Accumulated quantity above stock → [`OrderError::InsufficientStock`]
///    for the first such product in request order
/// 4. A line total or the order total overflows → [`OrderError::Validation`]
///
/// ## Returns
/// One [`NewOrderLine`] per request line, in request order, priced from the
/// snapshot (first match when the snapshot holds duplicate ids).
pub fn plan_order(
    lines: &[OrderLineRequest],
    snapshot: &[Product],
) -> OrderResult<Vec<NewOrderLine>> {
    if snapshot.is_empty() {
        return Err(OrderError::ProductsNotFound);
    }

    if let Some(missing) = lines.iter().find(|line| find(snapshot, &line.id).is_none()) {
        return Err(OrderError::ProductNotFound(missing.id.clone()));
    }

    let totals = accumulate(lines.iter().map(|l| (l.id.as_str(), l.quantity)));

    for line in lines {
        let product = find_or_missing(snapshot, &line.id)?;
        let requested = totals.get(line.id.as_str()).copied().unwrap_or(line.quantity);
        if !product.has_stock_for(requested) {
            return Err(OrderError::InsufficientStock {
                product_id: line.id.clone(),
                available: product.quantity,
                requested,
            });
        }
    }

    let mut total = Money::zero();
    let mut planned: Vec<NewOrderLine> = Vec::with_capacity(lines.len());
    for line in lines {
        let product = find_or_missing(snapshot, &line.id)?;
        total = product
            .price()
            .checked_mul(line.quantity)
            .and_then(|line_total| total.checked_add(line_total))
            .ok_or_else(total_overflow)?;

        planned.push(NewOrderLine {
            product_id: line.id.clone(),
            quantity: line.quantity,
            price_cents: product.price_cents,
        });
    }

    Ok(planned)
}

fn total_overflow() -> OrderError {
    OrderError::Validation(ValidationError::OutOfRange {
        field: "order total".to_string(),
        min: 0,
        max: i64::MAX,
    })
}

/// Computes the stock overwrites for the lines the store actually persisted.
///
/// One update per product id (first-appearance order in `persisted`):
/// `quantity = snapshot − Σ persisted quantities`, `expected = snapshot`.
///
/// Fails if the store persisted a product absent from the snapshot or more
/// units than the snapshot holds; either means the store diverged from the
/// plan.
pub fn stock_updates(
    snapshot: &[Product],
    persisted: &[OrderProduct],
) -> OrderResult<Vec<StockUpdate>> {
    let totals = accumulate(persisted.iter().map(|l| (l.product_id.as_str(), l.quantity)));

    let mut updates: Vec<StockUpdate> = Vec::with_capacity(totals.len());
    for line in persisted {
        if updates.iter().any(|u| u.product_id == line.product_id) {
            continue;
        }

        let product = find_or_missing(snapshot, &line.product_id)?;
        let consumed = totals
            .get(line.product_id.as_str())
            .copied()
            .unwrap_or(line.quantity);
        if !product.has_stock_for(consumed) {
            return Err(OrderError::InsufficientStock {
                product_id: line.product_id.clone(),
                available: product.quantity,
                requested: consumed,
            });
        }

        updates.push(StockUpdate {
            product_id: line.product_id.clone(),
            expected: product.quantity,
            quantity: product.quantity - consumed,
        });
    }

    Ok(updates)
}

fn accumulate<'a>(lines: impl Iterator<Item = (&'a str, i64)>) -> HashMap<&'a str, i64> {
    let mut totals: HashMap<&str, i64> = HashMap::new();
    for (id, quantity) in lines {
        let total = totals.entry(id).or_insert(0);
        *total = total.saturating_add(quantity);
    }
    totals
}

fn find<'a>(snapshot: &'a [Product], id: &str) -> Option<&'a Product> {
    snapshot.iter().find(|p| p.id == id)
}

fn find_or_missing<'a>(snapshot: &'a [Product], id: &str) -> OrderResult<&'a Product> {
    find(snapshot, id).ok_or_else(|| OrderError::ProductNotFound(id.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================
