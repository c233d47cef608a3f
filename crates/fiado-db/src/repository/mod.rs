//! # Repository Module
//!
//! Database repository implementations for Fiado.
//!
//! ## Repository Pattern
//! ```text
//! HTTP handler
//!     │  db.sales().commit(&draft)
//!     ▼
//! SaleRepository
//!     │  SQL, transactions
//!     ▼
//! SQLite database
//! ```
//! SQL lives only here; handlers never see a connection pool directly.
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - Products and categories
//! - [`customer::CustomerRepository`] - Customer records
//! - [`customer::PaymentMethodRepository`] - Payment methods
//! - [`sale::SaleRepository`] - The atomic sale commit and sale reads
//! - [`report::ReportRepository`] - Dashboard aggregates and the debtors list

pub mod catalog;
pub mod customer;
pub mod report;
pub mod sale;
