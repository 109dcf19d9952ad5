//! # Customer Repository
//!
//! Registration and lookup of customers. The order workflow only needs
//! `get_by_id`; registration exists so there is someone to place orders for.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use marketplace_core::validation::{validate_email, validate_name};
use marketplace_core::Customer;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Customer))` - Customer found
    /// * `Ok(None)` - Customer not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, email, created_at, updated_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Registers a new customer.
    ///
    /// The email is trimmed and lowercased before storage.
    ///
    /// ## Returns
    /// * `Ok(Customer)` - Inserted customer with generated id
    /// * `Err(DbError::UniqueViolation)` - Email already used
    /// * `Err(DbError::Invalid)` - Invalid name or email
    pub async fn insert(&self, name: &str, email: &str) -> DbResult<Customer> {
        validate_name("name", name)?;
        validate_email(email)?;

        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %customer.id, email = %customer.email, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, email, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&customer.email))?;

        Ok(customer)
    }

    /// Counts customers (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        let customer = repo.insert("Ada Lovelace", " Ada@Example.com ").await.unwrap();
        assert_eq!(customer.email, "ada@example.com");

        let found = repo.get_by_id(&customer.id).await.unwrap().unwrap();
        assert_eq!(found.id, customer.id);
        assert_eq!(found.name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_unknown_id_is_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.customers().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        repo.insert("Ada", "ada@example.com").await.unwrap();
        let err = repo.insert("Other Ada", "ada@example.com").await.unwrap_err();

        match err {
            DbError::UniqueViolation { value, .. } => assert_eq!(value, "ada@example.com"),
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db.customers().insert("Ada", "not-an-email").await.unwrap_err();
        assert!(matches!(err, DbError::Invalid(_)));
    }
}
