//! # Validation Module
//!
//! Turns raw form input into the typed payloads the repositories accept.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Action (raw form fields)                                      │
//! │  ├── date string, JSON-encoded saleItems, id, page/limit               │
//! │  └── THIS MODULE: parse + business rules → SalePayload / SaleQuery     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Repository (typed input only)                                 │
//! │  └── Never re-validates; trusts SalePayload                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity > 0)                                              │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Form validators collect every failure instead of stopping at the first,
//! and report them as [`FieldErrors`] keyed by top-level field.
//!
//! ## Usage
//! ```rust
//! use apotheca_core::validation::{validate_sale_form, SaleForm};
//!
//! let form = SaleForm {
//!     date: Some("2025-01-15T00:00:00.000Z".to_string()),
//!     sale_items: Some(r#"[{"itemId":1,"quantity":2,"price":10}]"#.to_string()),
//! };
//! let payload = validate_sale_form(&form).unwrap();
//! assert_eq!(payload.total().unwrap().to_string(), "20.00");
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{flatten_errors, FieldErrors, ValidationError};
use crate::money::Money;
use crate::query::{DateRange, Pagination, SaleQuery};
use crate::types::{SaleLine, SalePayload};
use crate::{DEFAULT_PAGE, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Earliest year a revenue report may be requested for.
pub const MIN_REPORT_YEAR: i64 = 1;

/// Latest year a revenue report may be requested for.
pub const MAX_REPORT_YEAR: i64 = 9999;

/// Most units a single sale line may carry.
pub const MAX_LINE_QUANTITY: i64 = 1_000_000;

/// Highest unit price accepted, in whole currency units.
pub const MAX_UNIT_PRICE: i64 = 1_000_000_000;

// =============================================================================
// Raw Inputs
// =============================================================================

/// Raw sale form as submitted: `date` plus a JSON-encoded `saleItems` array.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleForm {
    pub date: Option<String>,
    pub sale_items: Option<String>,
}

/// One element of the `saleItems` JSON array.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSaleLine {
    /// Display-only; ignored when the sale is written.
    #[serde(default)]
    pub name: Option<String>,
    pub item_id: i64,
    pub quantity: i64,
    pub price: Money,
}

/// Raw listing filter. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilter {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

// =============================================================================
// Scalar Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Example
/// ```rust
/// use apotheca_core::validation::validate_quantity;
///
/// assert!(validate_quantity("saleItems[0].quantity", 1).is_ok());
/// assert!(validate_quantity("saleItems[0].quantity", 0).is_err());
/// ```
pub fn validate_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if qty < 1 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a unit price. Zero is allowed.
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    if price.amount() > Decimal::from(MAX_UNIT_PRICE) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_UNIT_PRICE,
        });
    }
    Ok(())
}

/// Validates a sale id taken from a form field.
pub fn validate_sale_id(raw: Option<&str>) -> ValidationResult<i64> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    let id: i64 = raw.parse().map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: format!("'{raw}' is not an integer"),
    })?;

    if id < 1 {
        return Err(ValidationError::MustBePositive {
            field: "id".to_string(),
        });
    }
    Ok(id)
}

/// Validates the year of a revenue report.
pub fn validate_year(year: i64) -> ValidationResult<i32> {
    if !(MIN_REPORT_YEAR..=MAX_REPORT_YEAR).contains(&year) {
        return Err(ValidationError::OutOfRange {
            field: "year".to_string(),
            min: MIN_REPORT_YEAR,
            max: MAX_REPORT_YEAR,
        });
    }
    // Range check above keeps this lossless.
    Ok(year as i32)
}

/// Parses the sale timestamp. Requires a full ISO 8601 datetime with offset.
pub fn parse_sale_date(raw: Option<&str>) -> ValidationResult<DateTime<Utc>> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(ValidationError::Required {
            field: "date".to_string(),
        });
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ValidationError::InvalidFormat {
            field: "date".to_string(),
            reason: "Invalid ISO 8601 date format".to_string(),
        })
}

/// Parses a filter bound. Accepts a plain `YYYY-MM-DD` day or a full datetime,
/// of which only the calendar day is kept.
pub fn parse_filter_day(field: &str, raw: &str) -> ValidationResult<NaiveDate> {
    let raw = raw.trim();
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(day);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("'{raw}' is not a date"),
        })
}

// =============================================================================
// Form Validators
// =============================================================================

/// Parses the JSON-encoded `saleItems` field into sale lines.
///
/// An empty array is rejected; a sale must sell something.
pub fn parse_sale_items(raw: Option<&str>) -> Result<Vec<SaleLine>, Vec<ValidationError>> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(vec![ValidationError::Required {
            field: "saleItems".to_string(),
        }]);
    }

    let lines: Vec<RawSaleLine> = serde_json::from_str(raw).map_err(|e| {
        vec![ValidationError::InvalidFormat {
            field: "saleItems".to_string(),
            reason: e.to_string(),
        }]
    })?;

    if lines.is_empty() {
        return Err(vec![ValidationError::Empty {
            field: "saleItems".to_string(),
        }]);
    }

    let mut errors = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        if let Err(e) = validate_quantity(&format!("saleItems[{idx}].quantity"), line.quantity) {
            errors.push(e);
        }
        if let Err(e) = validate_price(&format!("saleItems[{idx}].price"), line.price) {
            errors.push(e);
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(lines
        .into_iter()
        .map(|line| SaleLine::new(line.item_id, line.quantity, line.price))
        .collect())
}

/// Validates a whole sale form into a [`SalePayload`].
pub fn validate_sale_form(form: &SaleForm) -> Result<SalePayload, FieldErrors> {
    let mut errors = Vec::new();

    let date = parse_sale_date(form.date.as_deref()).map_err(|e| errors.push(e)).ok();
    let items = parse_sale_items(form.sale_items.as_deref())
        .map_err(|e| errors.extend(e))
        .ok();

    match (date, items) {
        (Some(date), Some(items)) => {
            let payload = SalePayload::new(date, items);
            if payload.total().is_err() {
                errors.push(ValidationError::InvalidFormat {
                    field: "saleItems".to_string(),
                    reason: "sale total is too large".to_string(),
                });
                return Err(flatten_errors(&errors));
            }
            Ok(payload)
        }
        _ => Err(flatten_errors(&errors)),
    }
}

/// Validates a listing filter into a [`SaleQuery`].
///
/// Page defaults to 1 and limit to 10. The date range is applied only when
/// both bounds are supplied.
pub fn validate_list_filter(filter: &ListFilter) -> Result<SaleQuery, FieldErrors> {
    let mut errors = Vec::new();

    let page = filter.page.unwrap_or(i64::from(DEFAULT_PAGE));
    if page < 1 || page > i64::from(u32::MAX) {
        errors.push(ValidationError::OutOfRange {
            field: "page".to_string(),
            min: 1,
            max: i64::from(u32::MAX),
        });
    }

    let limit = filter.limit.unwrap_or(i64::from(DEFAULT_PAGE_LIMIT));
    if !(1..=i64::from(MAX_PAGE_LIMIT)).contains(&limit) {
        errors.push(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: i64::from(MAX_PAGE_LIMIT),
        });
    }

    let mut bound = |field: &str, raw: &Option<String>| match raw.as_deref() {
        Some(raw) => parse_filter_day(field, raw).map_err(|e| errors.push(e)).ok(),
        None => None,
    };
    let start = bound("startDate", &filter.start_date);
    let end = bound("endDate", &filter.end_date);

    if !errors.is_empty() {
        return Err(flatten_errors(&errors));
    }

    Ok(SaleQuery::new(
        Pagination::new(page as u32, limit as u32),
        DateRange::from_bounds(start, end),
    ))
}

// =============================================================================
// Unit Tests
// =============================================================================
