//! # Customer & Payment Method Repositories
//!
//! Database operations for the counterpart side of a sale: who bought, and
//! how they pay. Both are plain reference data; installment behavior hangs
//! off `payment_methods.requires_installments`.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use fiado_core::{Customer, PaymentMethod};

// =============================================================================
// Customers
// =============================================================================

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

    /// Lists all customers, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT id, name, phone, email, created_at FROM customers ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, phone, email, created_at FROM customers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Inserts a new customer.
    pub async fn create(
        &self,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> DbResult<Customer> {
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            phone: phone.map(str::to_string),
            email: email.map(str::to_string),
            created_at: Utc::now(),
        };

        debug!(id = %customer.id, name = %customer.name, "Creating customer");

        sqlx::query(
            "INSERT INTO customers (id, name, phone, email, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }
}

// =============================================================================
// Payment Methods
// =============================================================================

/// Repository for payment method database operations.
#[derive(Debug, Clone)]
pub struct PaymentMethodRepository {
    pool: SqlitePool,
}

impl PaymentMethodRepository {
    /// Creates a new PaymentMethodRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentMethodRepository { pool }
    }

    /// Lists all payment methods, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<PaymentMethod>> {
        let methods = sqlx::query_as::<_, PaymentMethod>(
            "SELECT id, name, requires_installments FROM payment_methods ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(methods)
    }

    /// Gets a payment method by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PaymentMethod>> {
        let method = sqlx::query_as::<_, PaymentMethod>(
            "SELECT id, name, requires_installments FROM payment_methods WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(method)
    }

    /// Inserts a new payment method.
    pub async fn create(&self, name: &str, requires_installments: bool) -> DbResult<PaymentMethod> {
        let method = PaymentMethod {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            requires_installments,
        };

        debug!(id = %method.id, name = %method.name, "Creating payment method");

        sqlx::query(
            "INSERT INTO payment_methods (id, name, requires_installments) VALUES (?1, ?2, ?3)",
        )
        .bind(&method.id)
        .bind(&method.name)
        .bind(method.requires_installments)
        .execute(&self.pool)
        .await?;

        Ok(method)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_customer_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customers = db.customers();

        let maria = customers
            .create("Maria Silva", Some("11 98765-4321"), None)
            .await
            .unwrap();

        let found = customers.get_by_id(&maria.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Maria Silva");
        assert_eq!(found.phone.as_deref(), Some("11 98765-4321"));
        assert!(found.email.is_none());
    }

    #[tokio::test]
    async fn test_payment_method_flags() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let methods = db.payment_methods();

        methods.create("Dinheiro", false).await.unwrap();
        let prazo = methods.create("A Prazo", true).await.unwrap();

        let all = methods.list().await.unwrap();
        assert_eq!(all.len(), 2);

        let found = methods.get_by_id(&prazo.id).await.unwrap().unwrap();
        assert!(found.requires_installments);
    }
}
