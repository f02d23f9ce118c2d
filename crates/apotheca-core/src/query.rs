//! # Sale Listing Queries
//!
//! Date-range filter and offset pagination for sale listings.
//!
//! ## Date Range Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  startDate = 2025-01-10, endDate = 2025-01-12                           │
//! │                                                                         │
//! │  2025-01-09T23:59:59.999Z   ✗ excluded                                  │
//! │  2025-01-10T00:00:00.000Z   ✓ first included instant                    │
//! │  2025-01-12T23:59:59.999Z   ✓ last included instant                     │
//! │  2025-01-13T00:00:00.000Z   ✗ excluded                                  │
//! │                                                                         │
//! │  Only one bound supplied? No filter is applied at all.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The range applies to the sale's `date`, never to its creation timestamp.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{DEFAULT_PAGE, DEFAULT_PAGE_LIMIT};

// =============================================================================
// Date Range
// =============================================================================

/// An inclusive range of calendar days (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range covering `start` through `end`, both days included.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Builds a range only when both bounds are present.
    pub fn from_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<Self> {
        match (start, end) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)),
            _ => None,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// First included instant: `start` at midnight.
    pub fn start_instant(&self) -> DateTime<Utc> {
        self.start.and_time(NaiveTime::MIN).and_utc()
    }

    /// Last included instant: one millisecond before the day after `end`.
    pub fn end_instant(&self) -> DateTime<Utc> {
        self.end.and_time(NaiveTime::MIN).and_utc() + Duration::days(1)
            - Duration::milliseconds(1)
    }

    /// Checks whether an instant falls inside the range.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start_instant() && instant <= self.end_instant()
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Offset pagination parameters. Construct through validation so that
/// `page >= 1` and `1 <= limit <= 100` always hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Pagination {
    /// Creates pagination from already-validated values.
    pub const fn new(page: u32, limit: u32) -> Self {
        Pagination { page, limit }
    }

    pub const fn page(&self) -> u32 {
        self.page
    }

    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows to skip before the requested page.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }

    /// Number of pages needed for `total` rows: `ceil(total / limit)`.
    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        let limit = i64::from(self.limit.max(1));
        (total + limit - 1) / limit
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination::new(DEFAULT_PAGE, DEFAULT_PAGE_LIMIT)
    }
}

// =============================================================================
// Sale Query
// =============================================================================

/// Validated listing request handed to the sale repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaleQuery {
    pub pagination: Pagination,
    pub range: Option<DateRange>,
}

impl SaleQuery {
    pub fn new(pagination: Pagination, range: Option<DateRange>) -> Self {
        SaleQuery { pagination, range }
    }
}

// =============================================================================
// Page
// =============================================================================

/// One page of results plus the metadata the client needs to paginate.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub result: Vec<T>,
    /// Rows matching the filter across all pages.
    pub total: i64,
    pub page: u32,
    pub total_pages: i64,
}

impl<T> Page<T> {
    /// Assembles a page, deriving `total_pages` from the pagination.
    pub fn new(result: Vec<T>, total: i64, pagination: Pagination) -> Self {
        Page {
            result,
            total,
            page: pagination.page(),
            total_pages: pagination.total_pages(total),
        }
    }

    /// Converts every row while keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            result: self.result.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            total_pages: self.total_pages,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_range_needs_both_bounds() {
        assert!(DateRange::from_bounds(Some(day(2025, 1, 1)), None).is_none());
        assert!(DateRange::from_bounds(None, Some(day(2025, 1, 1))).is_none());
        assert!(DateRange::from_bounds(Some(day(2025, 1, 1)), Some(day(2025, 1, 2))).is_some());
    }

    #[test]
    fn test_range_bounds_are_inclusive_to_the_millisecond() {
        let range = DateRange::new(day(2025, 1, 10), day(2025, 1, 12));

        let first = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();
        let last = Utc.with_ymd_and_hms(2025, 1, 12, 23, 59, 59).unwrap()
            + Duration::milliseconds(999);

        assert_eq!(range.start_instant(), first);
        assert_eq!(range.end_instant(), last);
        assert!(range.contains(first));
        assert!(range.contains(last));
        assert!(!range.contains(first - Duration::milliseconds(1)));
        assert!(!range.contains(last + Duration::milliseconds(1)));
    }

    #[test]
    fn test_total_pages_uses_limit() {
        let pagination = Pagination::new(3, 10);
        assert_eq!(pagination.total_pages(0), 0);
        assert_eq!(pagination.total_pages(1), 1);
        assert_eq!(pagination.total_pages(10), 1);
        assert_eq!(pagination.total_pages(11), 2);
        assert_eq!(pagination.total_pages(95), 10);
    }

    #[test]
    fn test_offset() {
        assert_eq!(Pagination::new(1, 10).offset(), 0);
        assert_eq!(Pagination::new(3, 25).offset(), 50);
    }

    #[test]
    fn test_page_serializes_camel_case() {
        let page: Page<u8> = Page::new(vec![], 0, Pagination::default());
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalPages"], 0);
        assert_eq!(json["page"], 1);
        assert_eq!(json["result"].as_array().unwrap().len(), 0);
    }
}
