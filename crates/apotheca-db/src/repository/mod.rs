//! # Repository Module
//!
//! Database repository implementations for Apotheca.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  Sale Service                                                          │
//! │       │                                                                 │
//! │       │  db.sales().create(&payload)                                   │
//! │       ▼                                                                 │
//! │  SaleRepository ──────────► with_transaction(pool, ...)                │
//! │  ├── create / update / delete         │                                │
//! │  ├── get_by_id / list                 ▼                                │
//! │  │                              StockLedger::apply_delta(conn, ..)     │
//! │  │                                                                      │
//! │  RevenueRepository (read-only)                                         │
//! │  └── revenue_by_year                                                   │
//! │                                                                         │
//! │  ItemRepository                                                        │
//! │  └── insert / get_by_id / stock / count                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`item::ItemRepository`] - Item registration and stock reads
//! - [`sale::SaleRepository`] - Stock-reconciling sale writes and reads
//! - [`revenue::RevenueRepository`] - Monthly revenue report
//! - [`stock::StockLedger`] - Stock deltas inside a caller's transaction

pub mod item;
pub mod revenue;
pub mod sale;
pub mod stock;

use apotheca_core::Money;
use chrono::{DateTime, Utc};

use crate::error::{DbError, DbResult};

/// Storage format for every timestamp column. Fixed width, so string
/// comparison in SQL matches chronological order.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub(crate) fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_timestamp(column: &str, raw: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::Internal(format!("Corrupt {column} timestamp '{raw}': {e}")))
}

pub(crate) fn parse_money(column: &str, raw: &str) -> DbResult<Money> {
    Money::from_storage_str(raw)
        .map_err(|e| DbError::Internal(format!("Corrupt {column} decimal '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_timestamp_is_fixed_width() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap();
        assert_eq!(format_timestamp(instant), "2025-01-15T00:00:00.000Z");

        let later = instant + Duration::milliseconds(7);
        assert_eq!(format_timestamp(later), "2025-01-15T00:00:00.007Z");
        assert_eq!(parse_timestamp("date", &format_timestamp(later)).unwrap(), later);
    }

    #[test]
    fn test_corrupt_values_are_internal_errors() {
        assert!(matches!(parse_timestamp("date", "yesterday"), Err(DbError::Internal(_))));
        assert!(matches!(parse_money("total", "abc"), Err(DbError::Internal(_))));
    }
}
