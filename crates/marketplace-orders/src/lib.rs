//! # marketplace-orders: Order Workflows
//!
//! Use cases that drive the storage ports of `marketplace-core`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  marketplace-cli ──► PlaceOrder::execute(request)                      │
//! │                      FindOrder::execute(order_id)                      │
//! │                            │                                            │
//! │                            │ Arc<dyn CustomerLookup>                    │
//! │                            │ Arc<dyn ProductLookup>                     │
//! │                            │ Arc<dyn OrderStore>                        │
//! │                            ▼                                            │
//! │            ┌───────────────────────────────┐                           │
//! │            │  marketplace-db (SQLite)      │  production               │
//! │            │  memory::InMemoryStore        │  tests / demos            │
//! │            └───────────────────────────────┘                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`place_order`] - The order placement workflow
//! - [`find_order`] - Order lookup
//! - [`memory`] - In-memory implementations of every port

pub mod find_order;
pub mod memory;
pub mod place_order;

pub use find_order::FindOrder;
pub use memory::InMemoryStore;
pub use place_order::PlaceOrder;
