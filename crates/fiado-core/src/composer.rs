//! # Sale Composer
//!
//! Accumulates validated line items for one in-progress sale and derives the
//! running total and the optional installment plan.
//!
//! ## Lifecycle
//! One `SaleComposer` is constructed per "new sale" session, lives only in
//! transient state, and is discarded on cancel or handed off (as a
//! [`SaleDraft`]) and discarded on successful commit. There is no shared
//! mutable state across sessions.
//!
//! ## Invariants
//! - A product's cumulative quantity never exceeds the stock recorded in the
//!   catalog snapshot; violating calls are rejected with no partial mutation
//! - The total always equals the sum of line totals: an explicit
//!   `recompute()` runs at the end of every mutating operation
//! - While an installment count is set, the plan is re-derived wholesale
//!   from the current total after every mutation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::installment::InstallmentScheduler;
use crate::money::Money;
use crate::types::{Installment, LineItem, PaymentMethod, PaymentStatus, Product, SaleDraft};

// =============================================================================
// SaleComposer
// =============================================================================

/// The in-progress sale being composed.
///
/// Owns its line items exclusively; persistence is someone else's job
/// (`buildPayload` hands a [`SaleDraft`] to the gateway).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleComposer {
    /// Date the session opened; installment due dates count from here.
    #[ts(as = "String")]
    composed_on: NaiveDate,

    /// Insertion order is display order.
    items: Vec<LineItem>,

    /// Derived: sum of line totals, in centavos.
    total_cents: i64,

    /// Desired installment count, if the payment method needs a plan.
    installment_count: Option<u32>,

    /// Derived: empty unless a count is set and the total is positive.
    plan: Vec<Installment>,

    /// Last stock rejection, shown inline next to the product picker.
    /// Cleared by the next successful add.
    stock_error: Option<String>,
}

impl SaleComposer {
    /// Starts an empty composition session dated `composed_on`.
    pub fn new(composed_on: NaiveDate) -> Self {
        SaleComposer {
            composed_on,
            items: Vec::new(),
            total_cents: 0,
            installment_count: None,
            plan: Vec::new(),
            stock_error: None,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The current line items, in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// The running total. Always the exact sum of line totals.
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// The current installment plan (empty when no count is set or the
    /// draft has no value yet).
    pub fn installment_plan(&self) -> &[Installment] {
        &self.plan
    }

    /// The message of the last rejected add, if it has not been superseded
    /// by a successful one.
    pub fn stock_error(&self) -> Option<&str> {
        self.stock_error.as_deref()
    }

    /// The session's composition date.
    pub fn composed_on(&self) -> NaiveDate {
        self.composed_on
    }

    /// True when no products have been added.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Adds `quantity` units of `product`, accumulating onto an existing
    /// line item if the product is already in the draft.
    ///
    /// ## Behavior
    /// - `quantity <= 0` is rejected before any stock check
    /// - the cumulative quantity must fit within the snapshot's stock;
    ///   otherwise the call fails with `InsufficientStock`, records the
    ///   inline stock error, and leaves every line item untouched
    /// - the unit price is frozen on first add; later adds reuse it
    /// - a successful add clears a previously recorded stock error
    pub fn add_product(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        let existing = self
            .items
            .iter()
            .find(|i| i.product_id == product.id)
            .map(|i| i.quantity)
            .unwrap_or(0);

        // The request arrives as an unclamped i64, so the sum must not be
        // allowed to wrap: an overflowing total is just another way of
        // exceeding stock.
        let cumulative = match existing.checked_add(quantity) {
            Some(c) if c <= product.stock_quantity => c,
            _ => {
                let err = CoreError::InsufficientStock {
                    product: product.name.clone(),
                    available: product.stock_quantity,
                    requested: existing.saturating_add(quantity),
                };
                self.stock_error = Some(err.to_string());
                return Err(err);
            }
        };

        match self.items.iter_mut().find(|i| i.product_id == product.id) {
            Some(item) => {
                item.quantity = cumulative;
                item.line_total_cents = item.unit_price().multiply_quantity(cumulative).cents();
            }
            None => {
                self.items.push(LineItem {
                    product_id: product.id.clone(),
                    product_name: product.name.clone(),
                    unit_price_cents: product.price_cents,
                    quantity,
                    line_total_cents: product.price().multiply_quantity(quantity).cents(),
                });
            }
        }

        self.stock_error = None;
        self.recompute();
        Ok(())
    }

    /// Removes the line item for `product_id` if present.
    ///
    /// Removing a product that was never added is a harmless no-op, not an
    /// error.
    pub fn remove_product(&mut self, product_id: &str) {
        self.items.retain(|i| i.product_id != product_id);
        self.recompute();
    }

    /// Sets the installment count and derives the plan from the current
    /// total. The plan is re-derived after every later mutation.
    pub fn set_installments(&mut self, count: u32) -> CoreResult<()> {
        if count == 0 {
            return Err(CoreError::InvalidInstallmentCount);
        }
        self.installment_count = Some(count);
        self.recompute();
        Ok(())
    }

    /// Drops the installment count and plan (e.g. the user switched to an
    /// upfront payment method).
    pub fn clear_installments(&mut self) {
        self.installment_count = None;
        self.recompute();
    }

    /// Recomputes all derived state. Runs at the end of every mutating
    /// operation; pure and synchronous.
    fn recompute(&mut self) {
        self.total_cents = self.items.iter().map(LineItem::line_total).sum::<Money>().cents();

        // The scheduler rejects non-positive totals, so guard here: the plan
        // is simply absent until the draft has value.
        self.plan = match self.installment_count {
            Some(count) if self.total().is_positive() => {
                match InstallmentScheduler::schedule(self.total(), count, self.composed_on) {
                    Ok(plan) => plan,
                    Err(err) => {
                        // count >= 1 and total > 0 are both checked before
                        // this call; reaching here means a guard regressed
                        debug_assert!(false, "scheduler rejected a guarded call: {err}");
                        Vec::new()
                    }
                }
            }
            _ => Vec::new(),
        };
    }

    // -------------------------------------------------------------------------
    // Payload
    // -------------------------------------------------------------------------

    /// Produces the persistable [`SaleDraft`].
    ///
    /// Fails with a validation error (never a silent default) when the
    /// customer is missing, the payment method is missing, or the draft has
    /// no line items. A payment method that requires installments demands a
    /// non-empty plan.
    pub fn build_payload(
        &self,
        customer_id: &str,
        payment_method: &PaymentMethod,
    ) -> CoreResult<SaleDraft> {
        if customer_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "customer_id".to_string(),
            }
            .into());
        }
        if payment_method.id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "payment_method_id".to_string(),
            }
            .into());
        }
        if self.items.is_empty() {
            return Err(ValidationError::EmptyDraft.into());
        }

        let installments = if payment_method.requires_installments {
            if self.plan.is_empty() {
                return Err(CoreError::MissingInstallmentPlan {
                    method: payment_method.name.clone(),
                });
            }
            Some(self.plan.clone())
        } else {
            None
        };

        Ok(SaleDraft {
            customer_id: customer_id.to_string(),
            payment_method_id: payment_method.id.clone(),
            items: self.items.clone(),
            total_cents: self.total_cents,
            payment_status: if installments.is_some() {
                PaymentStatus::Pending
            } else {
                PaymentStatus::Paid
            },
            installments,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn composer() -> SaleComposer {
        SaleComposer::new(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
    }

    fn product(id: &str, price_cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            category_id: None,
            name: format!("Produto {id}"),
            price_cents,
            stock_quantity: stock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn method(id: &str, requires_installments: bool) -> PaymentMethod {
        PaymentMethod {
            id: id.to_string(),
            name: if requires_installments { "A Prazo" } else { "Dinheiro" }.to_string(),
            requires_installments,
        }
    }

    #[test]
    fn add_product_appends_and_totals() {
        let mut c = composer();
        c.add_product(&product("p1", 1000, 5), 2).unwrap();

        assert_eq!(c.items().len(), 1);
        assert_eq!(c.items()[0].quantity, 2);
        assert_eq!(c.items()[0].line_total_cents, 2000);
        assert_eq!(c.total().cents(), 2000);
    }

    #[test]
    fn adding_same_product_accumulates_quantity() {
        let mut c = composer();
        let p = product("p1", 1000, 10);

        c.add_product(&p, 2).unwrap();
        c.add_product(&p, 3).unwrap();

        assert_eq!(c.items().len(), 1);
        assert_eq!(c.items()[0].quantity, 5);
        assert_eq!(c.total().cents(), 5000);
    }

    /// Accumulation scenario: stock 5 at R$ 10,00; 2 + 2 fit, the third
    /// add of 2 would hit 6 and is rejected with state unchanged.
    #[test]
    fn cumulative_quantity_respects_stock() {
        let mut c = composer();
        let p = product("P1", 1000, 5);

        c.add_product(&p, 2).unwrap();
        assert_eq!(c.total().cents(), 2000);

        c.add_product(&p, 2).unwrap();
        assert_eq!(c.items()[0].quantity, 4);
        assert_eq!(c.total().cents(), 4000);

        let err = c.add_product(&p, 2).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock { available: 5, requested: 6, .. }
        ));
        // No partial mutation
        assert_eq!(c.items()[0].quantity, 4);
        assert_eq!(c.total().cents(), 4000);
        assert!(c.stock_error().is_some());
    }

    #[test]
    fn huge_quantity_on_existing_line_cannot_wrap_past_stock() {
        let mut c = composer();
        let p = product("p1", 1000, 5);
        c.add_product(&p, 1).unwrap();

        // An i64::MAX request on top of an existing line would wrap the
        // cumulative sum negative and slip past the stock check
        let err = c.add_product(&p, i64::MAX).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock { available: 5, .. }
        ));

        // No partial mutation
        assert_eq!(c.items()[0].quantity, 1);
        assert_eq!(c.total().cents(), 1000);
        assert!(c.stock_error().is_some());
    }

    #[test]
    fn successful_add_clears_stock_error() {
        let mut c = composer();
        let scarce = product("p1", 500, 1);
        let plenty = product("p2", 300, 100);

        assert!(c.add_product(&scarce, 2).is_err());
        assert!(c.stock_error().is_some());

        c.add_product(&plenty, 1).unwrap();
        assert!(c.stock_error().is_none());
    }

    #[test]
    fn zero_or_negative_quantity_rejected_before_stock_check() {
        let mut c = composer();
        // Stock of zero would also fail, but the quantity check comes first
        let p = product("p1", 1000, 0);

        for qty in [0, -3] {
            let err = c.add_product(&p, qty).unwrap_err();
            assert!(matches!(err, CoreError::Validation(_)));
        }
        assert!(c.is_empty());
        // Quantity rejection is not a stock error
        assert!(c.stock_error().is_none());
    }

    #[test]
    fn remove_recomputes_total() {
        let mut c = composer();
        c.add_product(&product("p1", 1000, 5), 2).unwrap();
        c.add_product(&product("p2", 250, 5), 4).unwrap();
        assert_eq!(c.total().cents(), 3000);

        c.remove_product("p1");
        assert_eq!(c.items().len(), 1);
        assert_eq!(c.total().cents(), 1000);
    }

    #[test]
    fn removing_absent_product_is_a_noop() {
        let mut c = composer();
        c.add_product(&product("p1", 1000, 5), 2).unwrap();

        c.remove_product("never-added");

        assert_eq!(c.items().len(), 1);
        assert_eq!(c.total().cents(), 2000);
    }

    #[test]
    fn unit_price_frozen_at_first_add() {
        let mut c = composer();
        let mut p = product("p1", 1000, 10);
        c.add_product(&p, 1).unwrap();

        // Catalog price changes mid-session; the draft keeps the old price
        p.price_cents = 9999;
        c.add_product(&p, 1).unwrap();

        assert_eq!(c.items()[0].unit_price_cents, 1000);
        assert_eq!(c.total().cents(), 2000);
    }

    #[test]
    fn plan_follows_total_across_mutations() {
        let mut c = composer();
        let p = product("p1", 5000, 10);

        c.set_installments(2).unwrap();
        // No items yet: no value, no plan
        assert!(c.installment_plan().is_empty());

        c.add_product(&p, 2).unwrap();
        let plan = c.installment_plan();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.iter().map(|i| i.amount_cents).sum::<i64>(), 10000);

        // Month-end clamp counted from the composition date (2024-01-31)
        assert_eq!(plan[0].due_date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(plan[1].due_date, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());

        // Mutation replaces the plan wholesale
        c.add_product(&p, 1).unwrap();
        assert_eq!(
            c.installment_plan().iter().map(|i| i.amount_cents).sum::<i64>(),
            15000
        );

        c.clear_installments();
        assert!(c.installment_plan().is_empty());
    }

    #[test]
    fn set_installments_rejects_zero() {
        let mut c = composer();
        assert!(matches!(
            c.set_installments(0).unwrap_err(),
            CoreError::InvalidInstallmentCount
        ));
    }

    #[test]
    fn build_payload_validates_inputs() {
        let mut c = composer();

        // Empty draft
        let err = c.build_payload("cust-1", &method("pm-1", false)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::EmptyDraft)));

        c.add_product(&product("p1", 1000, 5), 1).unwrap();

        // Missing customer
        let err = c.build_payload("  ", &method("pm-1", false)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::Required { .. })));

        // Missing payment method id
        let err = c.build_payload("cust-1", &method("", false)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::Required { .. })));
    }

    #[test]
    fn build_payload_upfront_method() {
        let mut c = composer();
        c.add_product(&product("p1", 1000, 5), 3).unwrap();

        let draft = c.build_payload("cust-1", &method("pm-cash", false)).unwrap();
        assert_eq!(draft.total_cents, 3000);
        assert_eq!(draft.payment_status, PaymentStatus::Paid);
        assert!(draft.installments.is_none());
        assert_eq!(draft.items.len(), 1);
    }

    #[test]
    fn build_payload_installment_method() {
        let mut c = composer();
        c.add_product(&product("p1", 5000, 5), 2).unwrap();

        // Plan not configured yet: the method demands one
        let err = c.build_payload("cust-1", &method("pm-prazo", true)).unwrap_err();
        assert!(matches!(err, CoreError::MissingInstallmentPlan { .. }));

        c.set_installments(3).unwrap();
        let draft = c.build_payload("cust-1", &method("pm-prazo", true)).unwrap();
        assert_eq!(draft.payment_status, PaymentStatus::Pending);

        let plan = draft.installments.unwrap();
        assert_eq!(plan.len(), 3);
        assert_eq!(plan.iter().map(|i| i.amount_cents).sum::<i64>(), 10000);
        // 10000/3: first absorbs the +1 remainder
        assert_eq!(plan[0].amount_cents, 3334);
    }
}
