//! # Cart Ledger
//!
//! Rules for a customer's cart: stock checks on add/update and totals that
//! use the product's **live** price.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Ledger Operations                               │
//! │                                                                         │
//! │  Operation          Rule (this module)          Storage (zoo-db)        │
//! │  ─────────          ──────────────────          ────────────────        │
//! │                                                                         │
//! │  add(p, qty) ─────► plan_add ─────────────────► insert / set quantity   │
//! │  update(i, qty) ──► plan_update ──────────────► set quantity / delete   │
//! │  increase(i) ─────► plan_increase ────────────► set quantity            │
//! │  decrease(i) ─────► plan_decrease ────────────► set quantity / delete   │
//! │  remove(i) ───────► (none) ───────────────────► delete                  │
//! │                                                                         │
//! │  Stock is CHECKED here, never reserved. Two customers may both hold     │
//! │  the last unit in their carts; checkout is the guard.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;

// =============================================================================
// Cart Line
// =============================================================================

/// A cart item joined with its product's current state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartLine {
    /// Cart item ID.
    pub item_id: String,
    pub product_id: String,
    pub product_name: String,
    pub article: String,
    /// Product price right now, not when the item was added.
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// Product stock right now.
    pub stock: i64,
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Live unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    /// Whether current stock covers this line.
    #[inline]
    pub fn stock_covers(&self) -> bool {
        self.quantity <= self.stock
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A customer's cart as read at one instant.
///
/// ## Invariants
/// - At most one line per product
/// - Every line has `quantity >= 1`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    pub customer_id: String,
    pub lines: Vec<CartLine>,
}

impl Cart {
    pub fn new(customer_id: impl Into<String>, lines: Vec<CartLine>) -> Self {
        Cart {
            customer_id: customer_id.into(),
            lines,
        }
    }

    /// Sum of live line totals.
    pub fn total_price(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of quantities across all lines.
    pub fn total_items(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Finds the line holding a product.
    pub fn line_for_product(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// First line whose quantity exceeds current stock.
    pub fn first_shortage(&self) -> Option<&CartLine> {
        self.lines.iter().find(|l| !l.stock_covers())
    }
}

/// Cart totals summary for responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    /// Number of distinct products.
    pub line_count: usize,
    pub total_items: i64,
    pub total_price_cents: i64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.lines.len(),
            total_items: cart.total_items(),
            total_price_cents: cart.total_price().cents(),
        }
    }
}

// =============================================================================
// Planning
// =============================================================================

/// What storage should do with a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    /// Store this quantity.
    Set(i64),
    /// Delete the line.
    Remove,
}

/// Plans adding `requested` units of `product` to a cart that already holds
/// `in_cart` units of it. Returns the resulting line quantity.
///
/// ## Errors
/// - `InvalidQuantity` when `requested <= 0`
/// - `OutOfStock` when `in_cart + requested > product.quantity`, including
///   sums past `i64::MAX`
pub fn plan_add(product: &Product, in_cart: i64, requested: i64) -> CoreResult<i64> {
    if requested <= 0 {
        return Err(CoreError::InvalidQuantity {
            quantity: requested,
        });
    }

    match in_cart.checked_add(requested) {
        Some(wanted) if wanted <= product.quantity => Ok(wanted),
        _ => Err(CoreError::OutOfStock {
            product: product.name.clone(),
            available: product.quantity,
            in_cart,
            requested,
        }),
    }
}

/// Plans setting a line to `new_quantity`.
///
/// A quantity of zero or below removes the line.
pub fn plan_update(line: &CartLine, new_quantity: i64) -> CoreResult<LineChange> {
    if new_quantity <= 0 {
        return Ok(LineChange::Remove);
    }

    if new_quantity > line.stock {
        return Err(CoreError::OutOfStock {
            product: line.product_name.clone(),
            available: line.stock,
            in_cart: line.quantity,
            requested: new_quantity,
        });
    }

    Ok(LineChange::Set(new_quantity))
}

/// Plans a one-unit increase.
pub fn plan_increase(line: &CartLine) -> CoreResult<LineChange> {
    match line.quantity.checked_add(1) {
        Some(next) => plan_update(line, next),
        None => Err(CoreError::OutOfStock {
            product: line.product_name.clone(),
            available: line.stock,
            in_cart: line.quantity,
            requested: 1,
        }),
    }
}

/// Plans a one-unit decrease; the last unit removes the line.
pub fn plan_decrease(line: &CartLine) -> LineChange {
    if line.quantity > 1 {
        LineChange::Set(line.quantity - 1)
    } else {
        LineChange::Remove
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
