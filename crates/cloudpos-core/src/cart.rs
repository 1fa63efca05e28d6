//! # Cart
//!
//! The in-memory shopping cart backing the point-of-sale screen.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Operations                                   │
//! │                                                                         │
//! │  Shell Action             Cart Call               State Change          │
//! │  ────────────             ─────────               ────────────          │
//! │  Click product ─────────► add_item() ───────────► items.push / qty+=n   │
//! │  Change quantity ───────► update_quantity() ────► items[i].qty = n      │
//! │  Click remove ──────────► remove_item() ────────► items.remove(i)       │
//! │  Complete / cancel ─────► clear() ──────────────► items.clear()         │
//! │                                                                         │
//! │  Checkout reads totals() and to_sale_items(); it never mutates the      │
//! │  cart itself, so a failed online commit leaves the cart intact.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Items are unique by `product_id` (adding the same product accumulates)
//! - Quantity is always > 0 (updating to 0 removes the line)
//! - At most [`MAX_CART_ITEMS`](crate::MAX_CART_ITEMS) lines,
//!   [`MAX_ITEM_QUANTITY`](crate::MAX_ITEM_QUANTITY) per line

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::Money;
use crate::types::{CachedProduct, PendingSaleItem, TaxRate};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// An item in the shopping cart.
///
/// ## Design Notes
/// `name` and `unit_price` are a frozen snapshot of the product at the
/// moment it was added. If the cached product changes afterwards, lines
/// already in the cart keep the price the cashier quoted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product ID (remote reference).
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Unit price at time of adding (frozen).
    pub unit_price: Money,

    /// Quantity in cart.
    pub quantity: i64,

    /// When this item was added to the cart.
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a cart item from a cached product, freezing its price.
    pub fn from_product(product: &CachedProduct, quantity: i64) -> Self {
        CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// The shopping cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Items in the cart.
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Adds a product to the cart or increases quantity if already present.
    pub fn add_item(&mut self, product: &CachedProduct, quantity: i64) -> Result<(), CoreError> {
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            let new_qty = item.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            item.quantity = new_qty;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        self.items.push(CartItem::from_product(product, quantity));
        Ok(())
    }

    /// Updates the quantity of an item in the cart.
    ///
    /// Updating to 0 removes the line entirely.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> Result<(), CoreError> {
        if quantity <= 0 {
            return self.remove_item(product_id);
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = quantity;
            Ok(())
        } else {
            Err(CoreError::ProductNotInCart(product_id.to_string()))
        }
    }

    /// Removes an item from the cart by product ID.
    pub fn remove_item(&mut self, product_id: &str) -> Result<(), CoreError> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.product_id != product_id);

        if self.items.len() == initial_len {
            Err(CoreError::ProductNotInCart(product_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Clears all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of unique lines in the cart.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Subtotal (before tax).
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(|i| i.line_total()).sum()
    }

    /// Computes subtotal, tax, and total at the given store tax rate.
    pub fn totals(&self, tax_rate: TaxRate) -> CartTotals {
        let subtotal = self.subtotal();
        let tax = subtotal.calculate_tax(tax_rate);
        CartTotals {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Snapshots the cart lines into sale line items for commit or queueing.
    pub fn to_sale_items(&self) -> Vec<PendingSaleItem> {
        self.items
            .iter()
            .map(|i| PendingSaleItem {
                product_id: i.product_id.clone(),
                product_name: i.name.clone(),
                unit_price: i.unit_price,
                quantity: i.quantity,
            })
            .collect()
    }
}

/// Cart totals summary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product(id: &str, price_cents: i64) -> CachedProduct {
        CachedProduct {
            id: id.to_string(),
            store_id: "store-1".to_string(),
            name: format!("Product {}", id),
            price: Money::from_cents(price_cents),
            stock_quantity: 10,
            category: "general".to_string(),
        }
    }

    #[test]
    fn test_cart_add_item() {
        let mut cart = Cart::new();
        let product = test_product("1", 999); // $9.99

        cart.add_item(&product, 2).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.subtotal().cents(), 1998); // $19.98
    }

    #[test]
    fn test_cart_add_same_product_increases_quantity() {
        let mut cart = Cart::new();
        let product = test_product("1", 999);

        cart.add_item(&product, 2).unwrap();
        cart.add_item(&product, 3).unwrap();

        assert_eq!(cart.item_count(), 1); // Still one unique line
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_cart_update_quantity_to_zero_removes_line() {
        let mut cart = Cart::new();
        let product = test_product("1", 500);

        cart.add_item(&product, 2).unwrap();
        cart.update_quantity("1", 0).unwrap();

        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_remove_unknown_product() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.remove_item("nope"),
            Err(CoreError::ProductNotInCart(_))
        ));
    }

    #[test]
    fn test_cart_totals_with_tax() {
        let mut cart = Cart::new();
        cart.add_item(&test_product("1", 1000), 1).unwrap(); // $10.00

        let totals = cart.totals(TaxRate::from_bps(825));
        assert_eq!(totals.subtotal.cents(), 1000);
        assert_eq!(totals.tax.cents(), 83);
        assert_eq!(totals.total.cents(), 1083);
    }

    #[test]
    fn test_cart_totals_zero_tax() {
        // 2 × $3.00 + 1 × $5.00 at zero tax = $11.00 flat
        let mut cart = Cart::new();
        cart.add_item(&test_product("a", 300), 2).unwrap();
        cart.add_item(&test_product("b", 500), 1).unwrap();

        let totals = cart.totals(TaxRate::zero());
        assert_eq!(totals.subtotal.cents(), 1100);
        assert!(totals.tax.is_zero());
        assert_eq!(totals.total.cents(), 1100);
    }

    #[test]
    fn test_cart_quantity_limit() {
        let mut cart = Cart::new();
        let product = test_product("1", 100);

        assert!(matches!(
            cart.add_item(&product, MAX_ITEM_QUANTITY + 1),
            Err(CoreError::QuantityTooLarge { .. })
        ));
    }

    #[test]
    fn test_to_sale_items_freezes_lines() {
        let mut cart = Cart::new();
        cart.add_item(&test_product("a", 300), 2).unwrap();

        let items = cart.to_sale_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, "a");
        assert_eq!(items[0].unit_price.cents(), 300);
        assert_eq!(items[0].line_total().cents(), 600);
    }

    #[test]
    fn test_cart_clear() {
        let mut cart = Cart::new();
        cart.add_item(&test_product("1", 999), 2).unwrap();
        assert!(!cart.is_empty());

        cart.clear();
        assert!(cart.is_empty());
    }
}
