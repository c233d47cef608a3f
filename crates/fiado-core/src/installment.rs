//! # Installment Scheduler
//!
//! Deterministically splits a sale total into N dated installments with
//! exact centavo-level conservation.
//!
//! ## The Split Rule
//! `base = round_half_up(total / count)`; the exact remainder
//! `total - base * count` (positive or negative) is absorbed entirely by
//! installment #1, installments 2..N each get exactly `base`. The sum of
//! all installment amounts therefore equals the total, always.
//!
//! ```text
//! R$ 100,00 in 3x  ->  [R$ 33,34, R$ 33,33, R$ 33,33]
//! ```
//!
//! ## Due Dates
//! Installment i (1-based) is due i calendar months after the composition
//! date, with month-end clamping: one month after Jan 31 is the last day of
//! February. Dates are ascending and strictly increasing.

use chrono::{Months, NaiveDate};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Installment;

// =============================================================================
// Scheduler
// =============================================================================

/// Stateless installment scheduler.
///
/// Every call produces a complete replacement plan; there is no incremental
/// adjustment of individual installments.
pub struct InstallmentScheduler;

impl InstallmentScheduler {
    /// Splits `total` into `count` monthly installments starting one month
    /// after `composed_on`.
    ///
    /// ## Contract
    /// - `count >= 1`, otherwise `CoreError::InvalidInstallmentCount`
    /// - `total > 0`, otherwise `CoreError::NonPositiveTotal` (call sites
    ///   only schedule once the draft has value)
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use fiado_core::installment::InstallmentScheduler;
    /// use fiado_core::money::Money;
    ///
    /// let composed_on = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    /// let plan =
    ///     InstallmentScheduler::schedule(Money::from_cents(10000), 3, composed_on).unwrap();
    ///
    /// let amounts: Vec<i64> = plan.iter().map(|i| i.amount_cents).collect();
    /// assert_eq!(amounts, vec![3334, 3333, 3333]);
    /// ```
    pub fn schedule(
        total: Money,
        count: u32,
        composed_on: NaiveDate,
    ) -> CoreResult<Vec<Installment>> {
        if count == 0 {
            return Err(CoreError::InvalidInstallmentCount);
        }
        if !total.is_positive() {
            return Err(CoreError::NonPositiveTotal {
                total_cents: total.cents(),
            });
        }

        let count = count as i64;
        let base = total.divide_rounded(count);
        // Exact remainder, computed in centavos before any rounding loss can
        // compound. May be negative when base rounded up.
        let remainder = total - base.multiply_quantity(count);

        let mut plan = Vec::with_capacity(count as usize);
        for number in 1..=count {
            let amount = if number == 1 { base + remainder } else { base };
            plan.push(Installment {
                number,
                amount_cents: amount.cents(),
                due_date: due_date_for(composed_on, number),
            });
        }

        Ok(plan)
    }
}

/// Due date for installment `number`: that many calendar months after the
/// composition date, clamped to the end of shorter months.
fn due_date_for(composed_on: NaiveDate, number: i64) -> NaiveDate {
    composed_on
        .checked_add_months(Months::new(number as u32))
        .unwrap_or(NaiveDate::MAX)
}

// =============================================================================
// Unit Tests
// =============================================================================
