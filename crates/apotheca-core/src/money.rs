//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A month of pharmacy sales summed as f64 drifts by fractions of a cent. │
//! │                                                                         │
//! │  OUR SOLUTION: Exact base-10 decimals (rust_decimal)                    │
//! │    0.1 + 0.2 = 0.3                                                      │
//! │    Stored as the exact decimal string, never as REAL                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Boundary Format
//! - **Storage**: full precision decimal string (`"10.005"` stays `"10.005"`)
//! - **Client**: two-decimal string (`"20.00"`), via `Display` and `Serialize`
//!
//! ## Usage
//! ```rust
//! use apotheca_core::money::Money;
//!
//! let price = Money::parse("2.99").unwrap();
//! let line_total = price.checked_multiply_quantity(3).unwrap();
//! assert_eq!(line_total.to_string(), "8.97");
//!
//! let total = Money::parse("0.1").unwrap()
//!     .checked_add(Money::parse("0.2").unwrap())
//!     .unwrap();
//! assert_eq!(total, Money::parse("0.3").unwrap());
//! ```
//!
//! ## Overflow
//! `Decimal` tops out near 7.9e28. Every arithmetic operation here is
//! checked and reports [`CoreError::AmountOverflow`] instead of panicking.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};

/// Decimal places used when a value is shown to a client.
pub const DISPLAY_SCALE: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount held as an exact decimal.
///
/// ## Where Money is Used
/// ```text
/// SalePayload.items[].price ──► SaleLine.line_total() ──► Sale.total
///                                                            │
///                           revenue_by_year() ◄── Σ per month┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// Zero money value.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Wraps an existing decimal.
    #[inline]
    pub const fn from_decimal(value: Decimal) -> Self {
        Money(value)
    }

    /// Parses a decimal string such as `"10.00"` or `"0.5"`.
    ///
    /// ## Example
    /// ```rust
    /// use apotheca_core::money::Money;
    ///
    /// assert!(Money::parse("10.00").is_ok());
    /// assert!(Money::parse("ten").is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        Decimal::from_str(value.trim())
            .map(Money)
            .map_err(|e| ValidationError::InvalidFormat {
                field: "price".to_string(),
                reason: e.to_string(),
            })
    }

    /// Returns the inner decimal.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is below zero.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use apotheca_core::money::Money;
    ///
    /// let unit_price = Money::parse("2.99").unwrap();
    /// assert_eq!(
    ///     unit_price.checked_multiply_quantity(3).unwrap(),
    ///     Money::parse("8.97").unwrap()
    /// );
    /// ```
    #[inline]
    pub fn checked_multiply_quantity(&self, qty: i64) -> CoreResult<Self> {
        self.0
            .checked_mul(Decimal::from(qty))
            .map(Money)
            .ok_or(CoreError::AmountOverflow)
    }

    /// Adds two amounts.
    #[inline]
    pub fn checked_add(&self, other: Money) -> CoreResult<Self> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or(CoreError::AmountOverflow)
    }

    /// Sums amounts, failing on the first overflow.
    pub fn checked_sum<I>(amounts: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = CoreResult<Money>>,
    {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |acc, amount| acc.checked_add(amount?))
    }

    /// Full precision representation written to the database.
    pub fn to_storage_string(&self) -> String {
        self.0.normalize().to_string()
    }

    /// Reads a value previously written by [`Money::to_storage_string`].
    pub fn from_storage_str(value: &str) -> Result<Self, ValidationError> {
        Money::parse(value)
    }

    /// Two-decimal rendering used at the client boundary.
    pub fn to_display_string(&self) -> String {
        let mut rounded = self.0.round_dp(DISPLAY_SCALE);
        rounded.rescale(DISPLAY_SCALE);
        rounded.to_string()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money(value)
    }
}

/// Money always leaves the process as a two-decimal string.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_display_string())
    }
}

/// Accepts both JSON numbers (`10.5`) and strings (`"10.50"`).
impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Money)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
