//! # Error Response
//!
//! What a failed command prints.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PlaceOrder / FindOrder ── OrderError ──┐                               │
//! │                                         ├──► ErrorResponse ──► stdout   │
//! │  Repositories ──────────── DbError ─────┘        (JSON)       exit 1    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ```json
//! { "code": "INSUFFICIENT_STOCK", "message": "Insufficient stock for product ..." }
//! ```

use serde::Serialize;
use tracing::error;

use marketplace_core::{OrderError, StoreError};
use marketplace_db::DbError;

/// Machine-readable code plus human-readable message.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

/// Error codes for command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Customer, product or order does not exist
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Order has no lines
    EmptyOrder,

    /// Requested more than is in stock
    InsufficientStock,

    /// Stock changed while the order was being placed
    Conflict,

    /// Unique constraint (email, product name)
    Duplicate,

    /// Database operation failed
    DatabaseError,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ErrorResponse {
            code,
            message: message.into(),
        }
    }
}

impl From<OrderError> for ErrorResponse {
    fn from(err: OrderError) -> Self {
        let code = match &err {
            OrderError::CustomerNotFound(_)
            | OrderError::ProductsNotFound
            | OrderError::ProductNotFound(_)
            | OrderError::OrderNotFound(_) => ErrorCode::NotFound,
            OrderError::EmptyOrder => ErrorCode::EmptyOrder,
            OrderError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            OrderError::StockConflict(_) => ErrorCode::Conflict,
            OrderError::Validation(_) => ErrorCode::ValidationError,
            OrderError::Store(store) => return store_error(store),
        };

        ErrorResponse::new(code, err.to_string())
    }
}

fn store_error(err: &StoreError) -> ErrorResponse {
    match err {
        StoreError::NotFound { .. } => ErrorResponse::new(ErrorCode::NotFound, err.to_string()),
        StoreError::StockConflict { .. } => ErrorResponse::new(ErrorCode::Conflict, err.to_string()),
        StoreError::Duplicate { .. } => ErrorResponse::new(ErrorCode::Duplicate, err.to_string()),
        StoreError::Unavailable(e) => {
            // Log the actual error but return a generic message
            error!("Storage failure: {}", e);
            ErrorResponse::new(ErrorCode::DatabaseError, "Database operation failed")
        }
    }
}

impl From<DbError> for ErrorResponse {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ErrorResponse::new(ErrorCode::NotFound, err.to_string()),
            DbError::UniqueViolation { .. } => {
                ErrorResponse::new(ErrorCode::Duplicate, err.to_string())
            }
            DbError::Invalid(e) => ErrorResponse::new(ErrorCode::ValidationError, e.to_string()),
            DbError::StockConflict { .. } => {
                ErrorResponse::new(ErrorCode::Conflict, err.to_string())
            }
            DbError::ForeignKeyViolation { message } => {
                error!("Foreign key violation: {}", message);
                ErrorResponse::new(ErrorCode::ValidationError, "Invalid reference")
            }
            other => {
                error!("Database failure: {}", other);
                ErrorResponse::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ErrorResponse {}
