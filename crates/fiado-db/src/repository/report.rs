//! # Report Repository
//!
//! Read-only aggregates for the dashboard and the debtors list. These are
//! plain SQL rollups; no business logic lives here.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::DbResult;

// =============================================================================
// Report Rows
// =============================================================================

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DashboardSummary {
    /// Lifetime revenue across all sales, in centavos.
    pub revenue_cents: i64,

    /// Total number of committed sales.
    pub sales_count: i64,

    /// Distinct customers with at least one pending sale.
    pub debtors_count: i64,

    /// Products in the catalog.
    pub products_count: i64,
}

/// One customer owing money, with how much is still open.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DebtorRow {
    pub customer_id: String,
    pub customer_name: String,

    /// Sales of this customer still marked pending.
    pub open_sales: i64,

    /// Sum of this customer's unpaid installment amounts, in centavos.
    pub pending_cents: i64,

    /// Earliest unpaid due date, if any installment exists.
    pub next_due_date: Option<NaiveDate>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for reporting queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Computes the dashboard headline numbers in a single query.
    pub async fn dashboard_summary(&self) -> DbResult<DashboardSummary> {
        let summary = sqlx::query_as::<_, DashboardSummary>(
            r#"
            SELECT
                COALESCE((SELECT SUM(total_cents) FROM sales), 0)        AS revenue_cents,
                (SELECT COUNT(*) FROM sales)                             AS sales_count,
                (SELECT COUNT(DISTINCT customer_id) FROM sales
                 WHERE payment_status = 'pending')                       AS debtors_count,
                (SELECT COUNT(*) FROM products)                          AS products_count
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }

    /// Lists customers with pending sales, largest open amount first.
    ///
    /// The open amount is the sum of unpaid installment amounts, so partial
    /// settlement (paying off single installments) shrinks it.
    pub async fn list_debtors(&self) -> DbResult<Vec<DebtorRow>> {
        let debtors = sqlx::query_as::<_, DebtorRow>(
            r#"
            SELECT
                c.id                                   AS customer_id,
                c.name                                 AS customer_name,
                COUNT(DISTINCT s.id)                   AS open_sales,
                COALESCE(SUM(i.amount_cents), 0)       AS pending_cents,
                MIN(i.due_date)                        AS next_due_date
            FROM customers c
            JOIN sales s ON s.customer_id = c.id AND s.payment_status = 'pending'
            LEFT JOIN installments i ON i.sale_id = s.id AND i.status = 'pending'
            GROUP BY c.id, c.name
            ORDER BY pending_cents DESC, c.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(debtors)
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
    use fiado_core::SaleComposer;

    #[tokio::test]
    async fn test_empty_database_summary() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let summary = db.reports().dashboard_summary().await.unwrap();
        assert_eq!(summary.revenue_cents, 0);
        assert_eq!(summary.sales_count, 0);
        assert_eq!(summary.debtors_count, 0);
        assert_eq!(summary.products_count, 0);

        assert!(db.reports().list_debtors().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summary_and_debtors_after_sales() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let composed_on = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();

        let cafe = db.catalog().create_product("Café 500g", None, 1250, 50).await.unwrap();
        let maria = db.customers().create("Maria Silva", None, None).await.unwrap();
        let joao = db.customers().create("João Pereira", None, None).await.unwrap();
        let prazo = db.payment_methods().create("A Prazo", true).await.unwrap();
        let dinheiro = db.payment_methods().create("Dinheiro", false).await.unwrap();

        // Maria buys on credit: 10 x 1250 = 12500 in 3 installments
        let mut composer = SaleComposer::new(composed_on);
        composer.add_product(&cafe, 10).unwrap();
        composer.set_installments(3).unwrap();
        let draft = composer.build_payload(&maria.id, &prazo).unwrap();
        db.sales().commit(&draft).await.unwrap();

        // João pays cash: 2 x 1250 = 2500
        let mut composer = SaleComposer::new(composed_on);
        composer.add_product(&cafe, 2).unwrap();
        let draft = composer.build_payload(&joao.id, &dinheiro).unwrap();
        db.sales().commit(&draft).await.unwrap();

        let summary = db.reports().dashboard_summary().await.unwrap();
        assert_eq!(summary.revenue_cents, 15000);
        assert_eq!(summary.sales_count, 2);
        assert_eq!(summary.debtors_count, 1);
        assert_eq!(summary.products_count, 1);

        let debtors = db.reports().list_debtors().await.unwrap();
        assert_eq!(debtors.len(), 1);
        assert_eq!(debtors[0].customer_name, "Maria Silva");
        assert_eq!(debtors[0].open_sales, 1);
        assert_eq!(debtors[0].pending_cents, 12500);
        // First installment: one month after composition
        assert_eq!(
            debtors[0].next_due_date,
            Some(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap())
        );
    }
}
