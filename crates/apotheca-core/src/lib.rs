//! # apotheca-core: Pure Business Logic for Apotheca
//!
//! This crate holds the sale ledger's domain model as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Apotheca Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apotheca-actions (Action Layer)                 │   │
//! │  │    create_sale_action, list_sales_action, revenue_by_month ... │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ apotheca-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   query   │  │ validation│  │   │
//! │  │   │   Sale    │  │   Money   │  │ DateRange │  │  payload  │  │   │
//! │  │   │ SaleItem  │  │  totals   │  │Pagination │  │  filters  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 apotheca-db (Database Layer)                    │   │
//! │  │       SQLite queries, transactions, stock ledger, revenue       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, Sale, SaleItem, SalePayload, ...)
//! - [`money`] - Money type over exact decimals (no floating point!)
//! - [`query`] - Date-range filter and offset pagination
//! - [`response`] - The uniform result envelope
//! - [`error`] - Domain error types
//! - [`validation`] - Raw input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use apotheca_core::money::Money;
//! use apotheca_core::types::SaleLine;
//!
//! let lines = vec![SaleLine::new(1, 2, Money::parse("10.00").unwrap())];
//! let total = SaleLine::total_of(&lines).unwrap();
//!
//! assert_eq!(total.to_string(), "20.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod query;
pub mod response;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, FieldErrors, ValidationError};
pub use money::Money;
pub use query::{DateRange, Page, Pagination, SaleQuery};
pub use response::ServiceResponse;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page requested when the caller omits one.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when the caller omits one.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Largest page size a listing may request.
pub const MAX_PAGE_LIMIT: u32 = 100;
