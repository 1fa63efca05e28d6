//! # Validation Module
//!
//! Structural validation for records headed to the durable queue.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Cart rules (cart.rs)                                          │
//! │  ├── Quantity and line-count limits at edit time                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - record validation at enqueue time               │
//! │  ├── Non-empty references, positive quantities                          │
//! │  └── total == subtotal + tax                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite constraints (NOT NULL, PRIMARY KEY)                    │
//! │                                                                         │
//! │  Defense in depth: a malformed record must never reach the queue,       │
//! │  because the drain loop replays it verbatim hours later.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{PendingSale, PendingSaleItem};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a quantity for a sale line.
///
/// Quantities are at least 1; zero-quantity lines are removed at the cart
/// layer and must never appear in a queued record.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 1 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
            actual: quantity,
        });
    }
    Ok(())
}

/// Validates a single sale line.
pub fn validate_sale_item(item: &PendingSaleItem) -> ValidationResult<()> {
    if item.product_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "product_id".to_string(),
        });
    }

    validate_quantity(item.quantity)?;

    if item.unit_price.is_negative() {
        return Err(ValidationError::NegativeAmount {
            field: "unit_price".to_string(),
            actual: item.unit_price.cents(),
        });
    }

    Ok(())
}

/// Validates a pending sale before it is written to the durable queue.
///
/// ## Rules
/// - `id`, `store_id`, `cashier_id` must be non-empty
/// - at least one line item, each individually valid
/// - monetary sums non-negative and `total == subtotal + tax`
pub fn validate_pending_sale(sale: &PendingSale) -> ValidationResult<()> {
    for (field, value) in [
        ("id", &sale.id),
        ("store_id", &sale.store_id),
        ("cashier_id", &sale.cashier_id),
    ] {
        if value.trim().is_empty() {
            return Err(ValidationError::Required {
                field: field.to_string(),
            });
        }
    }

    if sale.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    for item in &sale.items {
        validate_sale_item(item)?;
    }

    for (field, amount) in [
        ("subtotal", sale.subtotal),
        ("tax", sale.tax),
        ("total", sale.total),
    ] {
        if amount.is_negative() {
            return Err(ValidationError::NegativeAmount {
                field: field.to_string(),
                actual: amount.cents(),
            });
        }
    }

    if sale.total != sale.subtotal + sale.tax {
        return Err(ValidationError::TotalMismatch {
            subtotal: sale.subtotal.cents(),
            tax: sale.tax.cents(),
            total: sale.total.cents(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::PaymentMethod;
    use chrono::Utc;

    fn sale_fixture() -> PendingSale {
        PendingSale {
            id: "tx-1700000000000-0042".to_string(),
            store_id: "store-1".to_string(),
            cashier_id: "cashier-1".to_string(),
            items: vec![PendingSaleItem {
                product_id: "prod-a".to_string(),
                product_name: "Item A".to_string(),
                unit_price: Money::from_cents(300),
                quantity: 2,
            }],
            subtotal: Money::from_cents(600),
            tax: Money::zero(),
            total: Money::from_cents(600),
            payment_method: PaymentMethod::Cash,
            notes: None,
            created_at: Utc::now(),
            synced: false,
        }
    }

    #[test]
    fn test_valid_sale_passes() {
        assert!(validate_pending_sale(&sale_fixture()).is_ok());
    }

    #[test]
    fn test_empty_id_rejected() {
        let mut sale = sale_fixture();
        sale.id = "  ".to_string();
        assert!(matches!(
            validate_pending_sale(&sale),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_no_items_rejected() {
        let mut sale = sale_fixture();
        sale.items.clear();
        assert!(validate_pending_sale(&sale).is_err());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut sale = sale_fixture();
        sale.items[0].quantity = 0;
        assert!(matches!(
            validate_pending_sale(&sale),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut sale = sale_fixture();
        sale.items[0].unit_price = Money::from_cents(-1);
        assert!(matches!(
            validate_pending_sale(&sale),
            Err(ValidationError::NegativeAmount { .. })
        ));
    }

    #[test]
    fn test_total_mismatch_rejected() {
        let mut sale = sale_fixture();
        sale.total = Money::from_cents(700);
        assert!(matches!(
            validate_pending_sale(&sale),
            Err(ValidationError::TotalMismatch { .. })
        ));
    }
}
