//! # Error Types
//!
//! Domain-specific error types for marketplace-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  marketplace-core errors (this file)                                   │
//! │  ├── OrderError       - Order placement / lookup failures              │
//! │  ├── StoreError       - What a storage port reports                    │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  marketplace-db errors (separate crate)                                │
//! │  └── DbError          - Database failures, converted into StoreError   │
//! │                                                                         │
//! │  Flow: DbError → StoreError → OrderError → ErrorResponse (CLI)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Order Error
// =============================================================================

/// Failures of the order workflows.
///
/// Every variant is terminal: the workflow stops at the first failing check
/// and nothing is retried.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The customer id does not resolve.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// The request carries no product lines.
    #[error("Order must contain at least one product")]
    EmptyOrder,

    /// None of the requested product ids resolve.
    #[error("Products not found")]
    ProductsNotFound,

    /// A requested product id does not resolve.
    ///
    /// Reports the first missing id in request order.
    #[error("Could not find product {0}")]
    ProductNotFound(String),

    /// The quantity requested for a product exceeds its stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Request [{P1, 3}, {P1, 3}]
    ///      │
    ///      ▼
    /// Accumulate per product: P1 → 6
    ///      │
    ///      ▼
    /// Check stock: available=5
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: "P1", available: 5, requested: 6 }
    /// ```
    #[error(
        "Insufficient stock for product {product_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Stock changed between the snapshot read and the commit.
    #[error("Stock for product {0} changed while the order was being placed")]
    StockConflict(String),

    /// Order lookup miss.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Storage port failure.
    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for OrderError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::StockConflict { product_id } => OrderError::StockConflict(product_id),
            other => OrderError::Store(other),
        }
    }
}

// =============================================================================
// Store Error
// =============================================================================

/// Errors reported by storage ports.
///
/// Adapters translate their native errors into these variants so the
/// workflow never depends on a particular backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Conditional stock update found a value other than the expected one.
    #[error("Stock conflict on product {product_id}")]
    StockConflict { product_id: String },

    /// Unique constraint violation.
    #[error("Duplicate {field}: '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// The backend failed (connection, query, transaction).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a StockConflict error.
    pub fn stock_conflict(product_id: impl Into<String>) -> Self {
        StoreError::StockConflict {
            product_id: product_id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet requirements.
/// Used for early validation before any storage call.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with OrderError.
pub type OrderResult<T> = Result<T, OrderError>;

/// Result type returned by storage ports.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
