//! # fiado-db: Database Layer for Fiado
//!
//! This crate provides database access for the Fiado back office.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Fiado Data Flow                              │
//! │                                                                     │
//! │  HTTP handler (commit_sale)                                         │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                     fiado-db (THIS CRATE)                     │ │
//! │  │                                                               │ │
//! │  │   ┌─────────────┐    ┌───────────────┐    ┌──────────────┐  │ │
//! │  │   │  Database   │    │ Repositories  │    │  Migrations  │  │ │
//! │  │   │  (pool.rs)  │    │ (catalog,     │    │  (embedded)  │  │ │
//! │  │   │             │◄───│  customer,    │    │              │  │ │
//! │  │   │ SqlitePool  │    │  sale, report)│    │ 001_init.sql │  │ │
//! │  │   └─────────────┘    └───────────────┘    └──────────────┘  │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite database (./data/fiado.db)                                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fiado_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/fiado.db")).await?;
//!
//! let products = db.catalog().list_products().await?;
//! let sale = db.sales().commit(&draft).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::customer::{CustomerRepository, PaymentMethodRepository};
pub use repository::report::{DashboardSummary, DebtorRow, ReportRepository};
pub use repository::sale::SaleRepository;
