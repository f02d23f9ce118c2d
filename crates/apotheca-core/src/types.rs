//! # Domain Types
//!
//! Core domain types used throughout Apotheca.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │      Sale       │   │    SaleItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  sale_id (FK)   │       │
//! │  │  name           │◄──┼──────────────── │───│  item_id (FK)   │       │
//! │  │  price          │   │  date           │   │  quantity       │       │
//! │  │  stock_quantity │   │  total          │   │  price (frozen) │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │   SalePayload   │   │  RevenueEntry   │                              │
//! │  │  date + lines   │   │  month + total  │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Client Shape
//! `Sale` serializes directly into the client-facing form: camelCase keys,
//! `total` and line `price` as two-decimal strings, timestamps as RFC 3339.

use chrono::{DateTime, Month, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;

// =============================================================================
// Item
// =============================================================================

/// A stocked item. Only `stock_quantity` is mutated by the sale ledger.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,

    /// Display name shown on sale lines.
    pub name: String,

    /// Current list price, copied onto a sale line when it is sold.
    #[ts(type = "string")]
    pub price: Money,

    /// Units on hand. May be negative when overselling is allowed.
    pub stock_quantity: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to register a new item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    pub price: Money,
    pub stock_quantity: i64,
}

/// Denormalized item reference carried on a sale line for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemRef {
    pub id: i64,
    pub name: String,
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale with its line items.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: i64,

    /// Calendar timestamp supplied by the caller; filters and revenue use it.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    /// Always Σ price × quantity of `sale_items` at the time of the write.
    #[ts(type = "string")]
    pub total: Money,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    pub sale_items: Vec<SaleItem>,
}

impl Sale {
    /// Recomputes the total from the current line items.
    pub fn computed_total(&self) -> CoreResult<Money> {
        Money::checked_sum(self.sale_items.iter().map(SaleItem::line_total))
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// The price is frozen at the time of sale and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub item_id: i64,
    pub quantity: i64,
    #[ts(type = "string")]
    pub price: Money,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[ts(optional)]
    pub item: Option<ItemRef>,
}

impl SaleItem {
    /// Returns price × quantity.
    #[inline]
    pub fn line_total(&self) -> CoreResult<Money> {
        self.price.checked_multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Sale Payload
// =============================================================================

/// One requested line of a sale write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub item_id: i64,
    /// Units sold, at least 1.
    pub quantity: i64,
    /// Unit price at the time of sale, not negative.
    pub price: Money,
}

impl SaleLine {
    pub fn new(item_id: i64, quantity: i64, price: Money) -> Self {
        SaleLine {
            item_id,
            quantity,
            price,
        }
    }

    /// Returns price × quantity.
    #[inline]
    pub fn line_total(&self) -> CoreResult<Money> {
        self.price.checked_multiply_quantity(self.quantity)
    }

    /// Σ price × quantity over all lines.
    pub fn total_of(lines: &[SaleLine]) -> CoreResult<Money> {
        Money::checked_sum(lines.iter().map(SaleLine::line_total))
    }
}

/// Validated input for creating or replacing a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalePayload {
    pub date: DateTime<Utc>,
    pub items: Vec<SaleLine>,
}

impl SalePayload {
    pub fn new(date: DateTime<Utc>, items: Vec<SaleLine>) -> Self {
        SalePayload { date, items }
    }

    /// The total the sale row will carry.
    ///
    /// ## Errors
    /// `CoreError::AmountOverflow` when the total cannot be represented.
    pub fn total(&self) -> CoreResult<Money> {
        SaleLine::total_of(&self.items)
    }
}

// =============================================================================
// Revenue Report
// =============================================================================

/// Revenue of one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RevenueEntry {
    /// English month name, "January" through "December".
    pub month: String,
    /// `"0"` for a month without sales, otherwise a two-decimal string.
    pub total: String,
}

impl RevenueEntry {
    pub fn new(month: Month, total: Money) -> Self {
        let total = if total.is_zero() {
            "0".to_string()
        } else {
            total.to_string()
        };
        RevenueEntry {
            month: month.name().to_string(),
            total,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
