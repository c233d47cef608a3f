//! # Domain Types
//!
//! Core domain types for the Fiado back office.
//!
//! ## Dual Role
//! Catalog and counterpart types (`Product`, `Customer`, `PaymentMethod`,
//! `Category`) are read-only snapshots from the composer's point of view:
//! they are fetched once when a composition session opens and never mutated
//! by the core. Persisted sale types (`Sale`, `SaleItem`, `SaleInstallment`)
//! use the snapshot pattern: product name and unit price are frozen at the
//! time of sale so history survives later catalog edits.
//!
//! ## Identity
//! Every entity carries a UUID v4 string `id`, generated by the persistence
//! layer. The core never invents identifiers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Catalog & Counterpart Records
// =============================================================================

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A product available for sale.
///
/// `stock_quantity` is the stock level observed when the catalog snapshot
/// was taken; the authoritative decrement happens inside the persistence
/// gateway's commit transaction.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,

    /// Optional category for catalog filtering.
    pub category_id: Option<String>,

    /// Display name shown in the picker and frozen onto sale items.
    pub name: String,

    /// Unit price in centavos.
    pub price_cents: i64,

    /// Available stock; never negative.
    pub stock_quantity: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// A customer record.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A payment method ("Dinheiro", "PIX", "A Prazo", ...).
///
/// When `requires_installments` is set, a sale paid with this method must
/// carry an installment plan and is persisted with pending payment status.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PaymentMethod {
    pub id: String,
    pub name: String,
    pub requires_installments: bool,
}

// =============================================================================
// Payment Status
// =============================================================================

/// Settlement state of a sale or of a single installment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Money is still owed (installment sales start here).
    Pending,
    /// Fully settled.
    Paid,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

// =============================================================================
// Draft Types (owned by the composer)
// =============================================================================

/// One product-quantity-price record within a draft.
///
/// Unit price is frozen when the product is first added; adding the same
/// product again accumulates quantity at the original price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: String,

    /// Denormalized for display and for the persisted snapshot.
    pub product_name: String,

    /// Unit price in centavos at the time of addition.
    pub unit_price_cents: i64,

    /// Always positive.
    pub quantity: i64,

    /// `unit_price_cents * quantity`, maintained on every mutation.
    pub line_total_cents: i64,
}

impl LineItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// One dated share of a draft's total, produced by the scheduler.
///
/// Plans are always replaced wholesale; individual installments are never
/// edited during composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    /// 1-based sequence number.
    pub number: i64,

    /// Amount in centavos. Installment #1 absorbs the rounding remainder.
    pub amount_cents: i64,

    /// Due `number` calendar months after the composition date.
    #[ts(as = "String")]
    pub due_date: NaiveDate,
}

impl Installment {
    /// Returns the installment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// The finished, not-yet-persisted sale handed to the persistence gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleDraft {
    pub customer_id: String,
    pub payment_method_id: String,

    /// Insertion order is display order.
    pub items: Vec<LineItem>,

    /// Sum of line totals, in centavos.
    pub total_cents: i64,

    /// Pending when an installment plan is present, paid otherwise.
    pub payment_status: PaymentStatus,

    /// Present only for payment methods that require installments.
    pub installments: Option<Vec<Installment>>,
}

// =============================================================================
// Persisted Sale Types
// =============================================================================

/// A committed sale header.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub customer_id: String,
    pub payment_method_id: String,
    pub total_cents: i64,
    pub payment_status: PaymentStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A persisted line item (product data frozen at time of sale).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit price in centavos at time of sale (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub line_total_cents: i64,
}

/// A persisted installment, carrying its settlement status.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleInstallment {
    pub id: String,
    pub sale_id: String,
    pub number: i64,
    pub amount_cents: i64,
    #[ts(as = "String")]
    pub due_date: NaiveDate,
    pub status: PaymentStatus,
}

// =============================================================================
// Unit Tests
// =============================================================================
