//! # marketplace-db: Database Layer for Marketplace
//!
//! This crate provides database access using SQLite with sqlx for async
//! operations, and adapts it to the storage ports of `marketplace-core`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Marketplace Data Flow                              │
//! │                                                                         │
//! │  PlaceOrder (marketplace-orders)                                       │
//! │       │  Arc<dyn CustomerLookup / ProductLookup / OrderStore>          │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 marketplace-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ CustomerRepo   │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo    │   │ 001_init.sql │  │   │
//! │  │   │ Transactions  │    │ OrderRepo      │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  │           ▲                    ▲                                │   │
//! │  │           └──── ports.rs ──────┘  (port trait impls)           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL mode)                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pool`] - Connection pool and configuration
//! - [`migrations`] - Embedded schema migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (customer, product, order)
//! - [`ports`] - Storage port adapters used by the order workflows
//!
//! ## Usage
//!
//! ```rust,ignore
//! use marketplace_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./marketplace.db")).await?;
//! let product = db.products().get_by_id("uuid-here").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod ports;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use ports::{SqliteOrderStore, SqliteOrderTransaction};

pub use repository::customer::CustomerRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
