//! # Domain Types
//!
//! Core domain types for the offline sale queue.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │  PendingSale    │   │ PendingSaleItem │   │ CachedProduct   │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id (queue key) │   │  product_id     │   │  id             │        │
//! │  │  store_id       │   │  product_name   │   │  store_id       │        │
//! │  │  totals (cents) │   │  unit_price     │   │  price (cents)  │        │
//! │  │  synced flag    │   │  quantity       │   │  stock_quantity │        │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘        │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │    TaxRate      │   │ PaymentMethod   │                              │
//! │  │  ─────────────  │   │  ─────────────  │                              │
//! │  │  bps (u32)      │   │  Cash Card      │                              │
//! │  │  825 = 8.25%    │   │  Check Other    │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `PendingSaleItem` freezes the product name and unit price at the moment
//! of checkout. A queued sale replayed hours later must not pick up price
//! changes that happened in between.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 825 bps = 8.25% (e.g., Texas sales tax)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// Payment category selected at checkout.
///
/// A small closed set: the offline path records the category only, never
/// card numbers or authorization details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Credit or debit card.
    Card,
    /// Paper check.
    Check,
    /// Anything else (store credit, voucher, ...).
    Other,
}

impl PaymentMethod {
    /// Lower-case form used for local storage and display.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Check => "check",
            PaymentMethod::Other => "other",
        }
    }

    /// Upper-case form the remote commit endpoint's enum expects.
    ///
    /// The local store keeps the relaxed lower-case spelling; normalization
    /// to the endpoint's casing happens once, when a commit request is built.
    pub const fn wire_code(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Card => "CARD",
            PaymentMethod::Check => "CHECK",
            PaymentMethod::Other => "OTHER",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = CoreError;

    /// Parses either casing; the stored form is lower-case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "check" => Ok(PaymentMethod::Check),
            "other" => Ok(PaymentMethod::Other),
            other => Err(CoreError::UnknownPaymentMethod(other.to_string())),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Pending Sale
// =============================================================================

/// A line item inside a queued sale.
///
/// Uses the snapshot pattern: name and price are frozen at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSaleItem {
    /// Product this line refers to (remote id, not validated locally).
    pub product_id: String,

    /// Product name at time of sale (frozen).
    pub product_name: String,

    /// Unit price in cents at time of sale (frozen).
    pub unit_price: Money,

    /// Quantity sold. Always >= 1.
    pub quantity: i64,
}

impl PendingSaleItem {
    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// A sale captured while offline, waiting to be replayed against the
/// remote backend.
///
/// ## Lifecycle
/// ```text
/// checkout (offline) ──► put() ──► synced=false ──► drain ──► synced=true
///                                       │                         │
///                                       └── survives restarts ────┘
/// ```
///
/// ## Invariants
/// - `id` is the queue key and is stable for the record's lifetime
/// - `total == subtotal + tax` (discount is not representable offline)
/// - `synced` flips to `true` exactly once and never reverts
/// - the record is never deleted by the queue (audit trail)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSale {
    /// Client-generated unique identifier (time-based plus random suffix).
    pub id: String,

    /// Store this sale belongs to. Opaque remote reference.
    pub store_id: String,

    /// Cashier who rang the sale. Opaque remote reference.
    pub cashier_id: String,

    /// Ordered line items, immutable once the record is created.
    pub items: Vec<PendingSaleItem>,

    /// Sum of line totals, in cents.
    pub subtotal: Money,

    /// Tax amount, in cents.
    pub tax: Money,

    /// Grand total, in cents. Always `subtotal + tax`.
    pub total: Money,

    /// Payment category chosen at checkout.
    pub payment_method: PaymentMethod,

    /// Optional free-text note from the cashier.
    pub notes: Option<String>,

    /// Client wall-clock creation time. Display/ordering only, never used
    /// for conflict resolution.
    pub created_at: DateTime<Utc>,

    /// Whether this record has been committed remotely.
    pub synced: bool,
}

// =============================================================================
// Cached Product
// =============================================================================

/// A local mirror of a remote product row.
///
/// Read-mostly: the cache is replaced wholesale (clear-then-repopulate) on
/// each successful refresh, never merged incrementally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedProduct {
    /// Remote product id.
    pub id: String,

    /// Store the product belongs to.
    pub store_id: String,

    /// Display name.
    pub name: String,

    /// Unit price in cents.
    pub price: Money,

    /// Stock level at the time of the last refresh. Informational while
    /// offline; the remote backend owns inventory truth.
    pub stock_quantity: i64,

    /// Product category.
    pub category: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(825);
        assert_eq!(rate.bps(), 825);
        assert!(!rate.is_zero());
        assert!(TaxRate::zero().is_zero());
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("CARD".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert_eq!(" check ".parse::<PaymentMethod>().unwrap(), PaymentMethod::Check);
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_payment_method_wire_code_is_upper() {
        assert_eq!(PaymentMethod::Cash.wire_code(), "CASH");
        assert_eq!(PaymentMethod::Other.wire_code(), "OTHER");
        assert_eq!(PaymentMethod::Card.as_str(), "card");
    }

    #[test]
    fn test_line_total() {
        let item = PendingSaleItem {
            product_id: "prod-1".into(),
            product_name: "Item A".into(),
            unit_price: Money::from_cents(300),
            quantity: 2,
        };
        assert_eq!(item.line_total().cents(), 600);
    }

    #[test]
    fn test_pending_sale_item_json_shape() {
        // The persisted payload uses camelCase keys with bare-integer money,
        // matching what the queue stores and the drain loop reads back.
        let item = PendingSaleItem {
            product_id: "prod-1".into(),
            product_name: "Item A".into(),
            unit_price: Money::from_cents(300),
            quantity: 2,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["productId"], "prod-1");
        assert_eq!(json["unitPrice"], 300);
        assert_eq!(json["quantity"], 2);
    }
}
