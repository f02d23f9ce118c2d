//! # Revenue Repository
//!
//! Monthly revenue for a calendar year.
//!
//! ```text
//! revenue_by_year(2025)
//!   sales.date in [2025-01-01T00:00:00.000Z, 2025-12-31T23:59:59.999Z]
//!        │
//!        ▼  Σ total per calendar month (exact decimals)
//!   [ January: "120.00", February: "0", ..., December: "35.50" ]
//! ```
//!
//! Totals are summed in Rust with `Decimal` rather than SQL `SUM()`, which
//! would coerce the TEXT column to floating point.

use apotheca_core::validation::validate_year;
use apotheca_core::{CoreError, Money, RevenueEntry};
use chrono::{Datelike, Month};
use sqlx::SqlitePool;
use tracing::debug;

use super::{parse_money, parse_timestamp};
use crate::error::DbResult;

/// Repository for revenue reports. Read-only.
#[derive(Debug, Clone)]
pub struct RevenueRepository {
    pool: SqlitePool,
}

impl RevenueRepository {
    /// Creates a new RevenueRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RevenueRepository { pool }
    }

    /// Returns twelve entries, January through December, for `year`.
    ///
    /// Months without sales report `"0"`. A year outside 1..=9999 is a
    /// validation error; a monthly total past the `Decimal` range is
    /// `CoreError::AmountOverflow`.
    pub async fn revenue_by_year(&self, year: i32) -> DbResult<Vec<RevenueEntry>> {
        validate_year(i64::from(year)).map_err(CoreError::from)?;

        let start = format!("{year:04}-01-01T00:00:00.000Z");
        let end = format!("{year:04}-12-31T23:59:59.999Z");

        debug!(year = year, "Aggregating revenue by month");

        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT date, total FROM sales
            WHERE date >= ?1 AND date <= ?2
            "#,
        )
        .bind(&start)
        .bind(&end)
        .fetch_all(&self.pool)
        .await?;

        let mut totals = [Money::ZERO; 12];
        for (date, total) in &rows {
            let month0 = parse_timestamp("sales.date", date)?.month0() as usize;
            totals[month0] = totals[month0].checked_add(parse_money("sales.total", total)?)?;
        }

        let mut month = Month::January;
        let mut report = Vec::with_capacity(12);
        for total in totals {
            report.push(RevenueEntry::new(month, total));
            month = month.succ();
        }

        debug!(year = year, sales = rows.len(), "Revenue aggregated");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use apotheca_core::{NewItem, SaleLine, SalePayload, ValidationError};
    use chrono::{TimeZone, Utc};

    fn money(s: &str) -> Money {
        Money::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_empty_year_reports_all_zero() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let report = db.revenue().revenue_by_year(2024).await.unwrap();
        assert_eq!(report.len(), 12);
        assert_eq!(report[0].month, "January");
        assert_eq!(report[11].month, "December");
        assert!(report.iter().all(|e| e.total == "0"));
    }

    #[tokio::test]
    async fn test_sums_per_month_with_exact_decimals() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let item = db
            .items()
            .insert(&NewItem {
                name: "Saline Drops".to_string(),
                price: money("0.10"),
                stock_quantity: 100,
            })
            .await
            .unwrap();

        let sales = [
            (Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(), "0.10"),
            (Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap(), "0.20"),
            (Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap(), "7.5"),
            (Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap(), "99"),
            (Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(), "99"),
        ];
        for (date, price) in sales {
            db.sales()
                .create(&SalePayload::new(
                    date,
                    vec![SaleLine::new(item.id, 1, money(price))],
                ))
                .await
                .unwrap();
        }

        let report = db.revenue().revenue_by_year(2025).await.unwrap();
        assert_eq!(report[0].total, "0.30");
        assert_eq!(report[1].total, "0");
        assert_eq!(report[2].month, "March");
        assert_eq!(report[2].total, "7.50");
        assert!(report[3..].iter().all(|e| e.total == "0"));
    }

    #[tokio::test]
    async fn test_rejects_out_of_range_year() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for year in [0, 10_000] {
            let err = db.revenue().revenue_by_year(year).await.unwrap_err();
            assert!(matches!(
                err,
                DbError::Domain(CoreError::Validation(ValidationError::OutOfRange { .. }))
            ));
        }
    }

    #[tokio::test]
    async fn test_monthly_total_overflow_is_an_error() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let item = db
            .items()
            .insert(&NewItem {
                name: "Insulin Pen".to_string(),
                price: money("1"),
                stock_quantity: 10,
            })
            .await
            .unwrap();

        let date = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        for _ in 0..2 {
            db.sales()
                .create(&SalePayload::new(
                    date,
                    vec![SaleLine::new(item.id, 1, money("50000000000000000000000000000"))],
                ))
                .await
                .unwrap();
        }

        let err = db.revenue().revenue_by_year(2025).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::AmountOverflow)));
    }
}
