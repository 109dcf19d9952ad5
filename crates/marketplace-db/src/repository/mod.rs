//! # Repository Module
//!
//! Database repository implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CLI / seed / port adapters                                            │
//! │       │                                                                 │
//! │       │  db.products().find_all_by_id(&ids)                            │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── find_all_by_id(&self, ids)                                        │
//! │  └── insert(&self, product)                                            │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes that must share the order transaction (`insert_order`,
//! `apply_stock_updates`) take a `&mut SqliteConnection` instead of the pool.
//!
//! ## Available Repositories
//!
//! - [`CustomerRepository`](customer::CustomerRepository) - Customer registration and lookup
//! - [`ProductRepository`](product::ProductRepository) - Product catalog and stock
//! - [`OrderRepository`](order::OrderRepository) - Order reads

pub mod customer;
pub mod order;
pub mod product;
