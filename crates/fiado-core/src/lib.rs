//! # fiado-core: Pure Business Logic for the Fiado Back Office
//!
//! This crate is the **heart** of Fiado. It contains all business logic as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Fiado Architecture                         │
//! │                                                                   │
//! │  ┌─────────────────────────────────────────────────────────────┐ │
//! │  │                  apps/server (HTTP API)                     │ │
//! │  │   session routes ──► catalog routes ──► report routes       │ │
//! │  └──────────────────────────┬──────────────────────────────────┘ │
//! │                             │                                     │
//! │  ┌──────────────────────────▼──────────────────────────────────┐ │
//! │  │              ★ fiado-core (THIS CRATE) ★                    │ │
//! │  │                                                             │ │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────────┐    │ │
//! │  │   │  types  │ │  money  │ │ composer │ │ installment │    │ │
//! │  │   │ Product │ │  Money  │ │SaleComp. │ │  Scheduler  │    │ │
//! │  │   │  Sale   │ │ split   │ │ LineItem │ │  due dates  │    │ │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └─────────────┘    │ │
//! │  │                                                             │ │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS        │ │
//! │  └──────────────────────────┬──────────────────────────────────┘ │
//! │                             │                                     │
//! │  ┌──────────────────────────▼──────────────────────────────────┐ │
//! │  │                  fiado-db (Database Layer)                   │ │
//! │  │          SQLite queries, migrations, repositories            │ │
//! │  └──────────────────────────────────────────────────────────────┘ │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Sale, SaleDraft, ...)
//! - [`money`] - Money type with integer centavo arithmetic (no floats!)
//! - [`composer`] - The in-progress sale (line items, total, plan)
//! - [`installment`] - Deterministic installment splitting and due dates
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic, same input = same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are centavos (i64)
//! 4. **Explicit Errors**: typed errors, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{NaiveDate, Utc};
//! use fiado_core::{Money, Product, SaleComposer};
//!
//! let cafe = Product {
//!     id: "p1".to_string(),
//!     category_id: None,
//!     name: "Café 500g".to_string(),
//!     price_cents: 1250,
//!     stock_quantity: 10,
//!     created_at: Utc::now(),
//!     updated_at: Utc::now(),
//! };
//!
//! let mut composer = SaleComposer::new(NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
//! composer.add_product(&cafe, 2).unwrap();
//! assert_eq!(composer.total(), Money::from_cents(2500));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod composer;
pub mod error;
pub mod installment;
pub mod money;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use fiado_core::Money` instead of
// `use fiado_core::money::Money`

pub use composer::SaleComposer;
pub use error::{CoreError, CoreResult, ValidationError};
pub use installment::InstallmentScheduler;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum installment count the scheduler will be asked for.
///
/// ## Business Reason
/// Small-business credit sales run on short horizons; anything past two
/// years is a typo, not a plan. The HTTP layer clamps requests to this.
pub const MAX_INSTALLMENTS: u32 = 24;

/// Maximum distinct products in one sale draft.
///
/// ## Business Reason
/// Prevents runaway drafts from an erratic client; a counter sale at a
/// neighborhood store never legitimately approaches this.
pub const MAX_DRAFT_ITEMS: usize = 100;
