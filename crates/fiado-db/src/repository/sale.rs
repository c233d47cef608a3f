//! # Sale Repository
//!
//! Database operations for committed sales, their items, and their
//! installments.
//!
//! ## The Commit Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  SaleRepository::commit(&draft)                                     │
//! │                                                                     │
//! │  BEGIN                                                              │
//! │    INSERT sale header                                               │
//! │    INSERT every sale item (name + unit price frozen)                │
//! │    INSERT every installment (if the draft carries a plan)           │
//! │    For each item:                                                   │
//! │      UPDATE products SET stock = stock - qty                        │
//! │        WHERE id = ? AND stock >= qty                                │
//! │      rows_affected == 0 → ROLLBACK (StockConflict)                  │
//! │  COMMIT                                                             │
//! │                                                                     │
//! │  Either the whole sale exists and stock moved, or nothing did.      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//! The conditional UPDATE is the authoritative stock check; the composer's
//! snapshot check only exists for early user feedback.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use fiado_core::{PaymentStatus, Sale, SaleDraft, SaleInstallment, SaleItem};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Persists a finished draft atomically and decrements stock.
    ///
    /// ## Returns
    /// The committed sale header with its generated ID.
    ///
    /// ## Errors
    /// - `StockConflict` when any product no longer has enough stock; the
    ///   transaction is rolled back and nothing is persisted
    /// - `ForeignKeyViolation` for unknown customer or payment method IDs
    pub async fn commit(&self, draft: &SaleDraft) -> DbResult<Sale> {
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            customer_id: draft.customer_id.clone(),
            payment_method_id: draft.payment_method_id.clone(),
            total_cents: draft.total_cents,
            payment_status: draft.payment_status,
            created_at: Utc::now(),
        };

        debug!(
            id = %sale.id,
            total_cents = sale.total_cents,
            items = draft.items.len(),
            "Committing sale"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (id, customer_id, payment_method_id, total_cents, payment_status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.customer_id)
        .bind(&sale.payment_method_id)
        .bind(sale.total_cents)
        .bind(sale.payment_status)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        for item in &draft.items {
            sqlx::query(
                r#"
                INSERT INTO sale_items (id, sale_id, product_id, name_snapshot, unit_price_cents, quantity, line_total_cents)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&sale.id)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.unit_price_cents)
            .bind(item.quantity)
            .bind(item.line_total_cents)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(installments) = &draft.installments {
            for inst in installments {
                sqlx::query(
                    r#"
                    INSERT INTO installments (id, sale_id, number, amount_cents, due_date, status)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                )
                .bind(Uuid::new_v4().to_string())
                .bind(&sale.id)
                .bind(inst.number)
                .bind(inst.amount_cents)
                .bind(inst.due_date)
                .bind(PaymentStatus::Pending)
                .execute(&mut *tx)
                .await?;
            }
        }

        // Conditional decrement: the WHERE clause is the stock check, so a
        // concurrent commit cannot interleave between check and write.
        for item in &draft.items {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET stock_quantity = stock_quantity - ?1, updated_at = ?2
                WHERE id = ?3 AND stock_quantity >= ?1
                "#,
            )
            .bind(item.quantity)
            .bind(Utc::now())
            .bind(&item.product_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Dropping the transaction also rolls back; being explicit
                // surfaces rollback failures instead of swallowing them.
                tx.rollback().await?;
                return Err(DbError::stock_conflict(&item.product_id));
            }
        }

        tx.commit().await?;

        info!(id = %sale.id, total_cents = sale.total_cents, "Sale committed");
        Ok(sale)
    }

    /// Gets a sale header by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, customer_id, payment_method_id, total_cents, payment_status, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all items for a sale, in insertion order.
    pub async fn items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, name_snapshot, unit_price_cents, quantity, line_total_cents
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets all installments for a sale, ordered by number.
    pub async fn installments(&self, sale_id: &str) -> DbResult<Vec<SaleInstallment>> {
        let installments = sqlx::query_as::<_, SaleInstallment>(
            r#"
            SELECT id, sale_id, number, amount_cents, due_date, status
            FROM installments
            WHERE sale_id = ?1
            ORDER BY number
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(installments)
    }

    /// Lists the most recent sales, newest first.
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, customer_id, payment_method_id, total_cents, payment_status, created_at
            FROM sales
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use fiado_core::{Product, SaleComposer};

    struct Fixture {
        db: Database,
        cafe: Product,
        arroz: Product,
        customer_id: String,
        prazo: fiado_core::PaymentMethod,
        dinheiro: fiado_core::PaymentMethod,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let cafe = db.catalog().create_product("Café 500g", None, 1250, 10).await.unwrap();
        let arroz = db.catalog().create_product("Arroz 5kg", None, 2590, 3).await.unwrap();
        let customer = db.customers().create("João Pereira", None, None).await.unwrap();
        let prazo = db.payment_methods().create("A Prazo", true).await.unwrap();
        let dinheiro = db.payment_methods().create("Dinheiro", false).await.unwrap();

        Fixture {
            db,
            cafe,
            arroz,
            customer_id: customer.id,
            prazo,
            dinheiro,
        }
    }

    fn composed_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    }

    #[tokio::test]
    async fn test_commit_persists_everything_and_moves_stock() {
        let f = fixture().await;

        let mut composer = SaleComposer::new(composed_on());
        composer.add_product(&f.cafe, 4).unwrap();
        composer.add_product(&f.arroz, 1).unwrap();
        composer.set_installments(3).unwrap();
        let draft = composer.build_payload(&f.customer_id, &f.prazo).unwrap();

        let sale = f.db.sales().commit(&draft).await.unwrap();

        // Header
        let stored = f.db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(stored.total_cents, 4 * 1250 + 2590);
        assert_eq!(stored.payment_status, PaymentStatus::Pending);

        // Items with frozen snapshots
        let items = f.db.sales().items(&sale.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name_snapshot, "Café 500g");
        assert_eq!(items[0].unit_price_cents, 1250);

        // Installments conserve the total, remainder on #1
        let installments = f.db.sales().installments(&sale.id).await.unwrap();
        assert_eq!(installments.len(), 3);
        let sum: i64 = installments.iter().map(|i| i.amount_cents).sum();
        assert_eq!(sum, stored.total_cents);
        assert!(installments.iter().all(|i| i.status == PaymentStatus::Pending));
        assert_eq!(installments[0].due_date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        // Stock moved
        let cafe = f.db.catalog().get_product(&f.cafe.id).await.unwrap().unwrap();
        assert_eq!(cafe.stock_quantity, 6);
        let arroz = f.db.catalog().get_product(&f.arroz.id).await.unwrap().unwrap();
        assert_eq!(arroz.stock_quantity, 2);
    }

    #[tokio::test]
    async fn test_upfront_sale_has_no_installments_and_is_paid() {
        let f = fixture().await;

        let mut composer = SaleComposer::new(composed_on());
        composer.add_product(&f.cafe, 1).unwrap();
        let draft = composer.build_payload(&f.customer_id, &f.dinheiro).unwrap();

        let sale = f.db.sales().commit(&draft).await.unwrap();

        let stored = f.db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Paid);
        assert!(f.db.sales().installments(&sale.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stock_conflict_rolls_back_the_whole_sale() {
        let f = fixture().await;

        // Compose against a snapshot that is stale by the time we commit:
        // someone else takes 2 of the 3 Arroz units first.
        let mut composer = SaleComposer::new(composed_on());
        composer.add_product(&f.cafe, 1).unwrap();
        composer.add_product(&f.arroz, 3).unwrap();
        let draft = composer.build_payload(&f.customer_id, &f.dinheiro).unwrap();

        let mut rival = SaleComposer::new(composed_on());
        rival.add_product(&f.arroz, 2).unwrap();
        let rival_draft = rival.build_payload(&f.customer_id, &f.dinheiro).unwrap();
        f.db.sales().commit(&rival_draft).await.unwrap();

        let err = f.db.sales().commit(&draft).await.unwrap_err();
        assert!(matches!(err, DbError::StockConflict { .. }));

        // Nothing from the failed sale persisted, including the café item
        // whose own stock would have sufficed
        let sales = f.db.sales().list_recent(10).await.unwrap();
        assert_eq!(sales.len(), 1);
        let cafe = f.db.catalog().get_product(&f.cafe.id).await.unwrap().unwrap();
        assert_eq!(cafe.stock_quantity, 10);
    }

    #[tokio::test]
    async fn test_commit_rejects_unknown_customer() {
        let f = fixture().await;

        let mut composer = SaleComposer::new(composed_on());
        composer.add_product(&f.cafe, 1).unwrap();
        let draft = composer.build_payload("no-such-customer", &f.dinheiro).unwrap();

        let err = f.db.sales().commit(&draft).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_recent_is_newest_first() {
        let f = fixture().await;

        for _ in 0..3 {
            let mut composer = SaleComposer::new(composed_on());
            composer.add_product(&f.cafe, 1).unwrap();
            let draft = composer.build_payload(&f.customer_id, &f.dinheiro).unwrap();
            f.db.sales().commit(&draft).await.unwrap();
        }

        let sales = f.db.sales().list_recent(2).await.unwrap();
        assert_eq!(sales.len(), 2);
        assert!(sales[0].created_at >= sales[1].created_at);
    }
}
