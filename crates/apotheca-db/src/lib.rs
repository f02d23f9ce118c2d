//! # apotheca-db: Database Layer for Apotheca
//!
//! This crate provides database access for the Apotheca sales ledger.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Apotheca Data Flow                               │
//! │                                                                         │
//! │  Sale Service (apotheca-actions)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   apotheca-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ SaleRepo      │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ItemRepo      │    │ 001_init.sql │  │   │
//! │  │   │ StockPolicy   │    │ RevenueRepo   │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                               │   │
//! │  │             with_transaction ──┴── StockLedger                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (file or :memory:)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`transaction`] - Commit-or-rollback unit of work
//! - [`error`] - Database error types
//! - [`repository`] - Sale, item, revenue repositories and the stock ledger
//! - [`seed`] - Development data
//!
//! ## Usage
//!
//! ```rust,ignore
//! use apotheca_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./apotheca.db")).await?;
//!
//! let sale = db.sales().create(&payload).await?;
//! let report = db.revenue().revenue_by_year(2025).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;
pub mod transaction;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig};
pub use transaction::with_transaction;

// Repository re-exports for convenience
pub use repository::item::ItemRepository;
pub use repository::revenue::RevenueRepository;
pub use repository::sale::SaleRepository;
pub use repository::stock::{StockLedger, StockPolicy};
