//! # Catalog Repository
//!
//! Database operations for products and categories.
//!
//! The composer never talks to this repository mid-session: a session takes
//! one catalog snapshot when it opens and validates against that. The
//! authoritative stock check happens later, inside the sale commit
//! transaction.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use fiado_core::{Category, Product};

/// Repository for catalog database operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// Lists all products, ordered by name. This is the catalog snapshot a
    /// composition session starts from.
    pub async fn list_products(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, category_id, name, price_cents, stock_quantity, created_at, updated_at
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists the products of one category, ordered by name.
    pub async fn list_products_in_category(&self, category_id: &str) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, category_id, name, price_cents, stock_quantity, created_at, updated_at
            FROM products
            WHERE category_id = ?1
            ORDER BY name
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by ID.
    pub async fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, category_id, name, price_cents, stock_quantity, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product and returns it with its generated ID.
    pub async fn create_product(
        &self,
        name: &str,
        category_id: Option<&str>,
        price_cents: i64,
        stock_quantity: i64,
    ) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            category_id: category_id.map(str::to_string),
            name: name.to_string(),
            price_cents,
            stock_quantity,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Creating product");

        sqlx::query(
            r#"
            INSERT INTO products (id, category_id, name, price_cents, stock_quantity, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.category_id)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.stock_quantity)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    /// Lists all categories, ordered by name.
    pub async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Inserts a new category.
    pub async fn create_category(&self, name: &str) -> DbResult<Category> {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };

        debug!(id = %category.id, name = %category.name, "Creating category");

        sqlx::query("INSERT INTO categories (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(&category.id)
            .bind(&category.name)
            .bind(category.created_at)
            .execute(&self.pool)
            .await?;

        Ok(category)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_create_and_list_products() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = db.catalog();

        let bebidas = catalog.create_category("Bebidas").await.unwrap();
        catalog
            .create_product("Refrigerante 2L", Some(&bebidas.id), 899, 24)
            .await
            .unwrap();
        catalog
            .create_product("Café 500g", None, 1250, 10)
            .await
            .unwrap();

        let products = catalog.list_products().await.unwrap();
        assert_eq!(products.len(), 2);
        // Ordered by name
        assert_eq!(products[0].name, "Café 500g");
        assert_eq!(products[1].name, "Refrigerante 2L");
        assert_eq!(products[1].category_id.as_deref(), Some(bebidas.id.as_str()));

        let in_bebidas = catalog.list_products_in_category(&bebidas.id).await.unwrap();
        assert_eq!(in_bebidas.len(), 1);
        assert_eq!(in_bebidas[0].name, "Refrigerante 2L");
    }

    #[tokio::test]
    async fn test_get_product_by_id() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = db.catalog();

        let created = catalog.create_product("Arroz 5kg", None, 2590, 8).await.unwrap();

        let found = catalog.get_product(&created.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Arroz 5kg");
        assert_eq!(found.price_cents, 2590);
        assert_eq!(found.stock_quantity, 8);

        assert!(catalog.get_product("missing").await.unwrap().is_none());
    }
}
