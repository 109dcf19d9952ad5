//! # marketplace-core: Pure Business Logic for Order Placement
//!
//! This crate holds the domain model and every rule of order placement as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Marketplace Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  marketplace-cli (binary)                       │   │
//! │  │        place, order, add-customer, add-product                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              marketplace-orders (PlaceOrder)                    │   │
//! │  │     lookup ──► plan ──► create ──► update stock ──► commit      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ports                                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ marketplace-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ placement │  │   ports   │  │   │
//! │  │   │  Product  │  │   Money   │  │ plan_order│  │ OrderStore│  │   │
//! │  │   │   Order   │  │           │  │ StockUpd. │  │ Lookups   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                ▲                                        │
//! │  ┌─────────────────────────────┴───────────────────────────────────┐   │
//! │  │              marketplace-db (SQLite adapters)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, Product, Order, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain and storage-port error types
//! - [`validation`] - Input validation
//! - [`placement`] - Pure order planning (stock check, pricing, decrements)
//! - [`ports`] - Storage contracts consumed by the order workflow
//!
//! ## Example Usage
//!
//! ```rust
//! use marketplace_core::money::Money;
//!
//! let price = Money::from_cents(500); // $5.00
//! let line_total = price * 3;
//! assert_eq!(line_total.cents(), 1500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod placement;
pub mod ports;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{OrderError, OrderResult, StoreError, StoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of lines accepted in a single order request.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 10000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 9_999;
