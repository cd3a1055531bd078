//! # Domain Types
//!
//! Core domain entities used throughout Zooshop.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog                  Cart                  Orders                  │
//! │  ───────                  ────                  ──────                  │
//! │  Category ◄─┐             CartItem              Order ──► OrderStatus   │
//! │  Product ───┘             (live price)          OrderItem (frozen price)│
//! │  Supplier                                                               │
//! │  SupplierProduct          Promotions            Feedback                │
//! │  SupplierPurchase         ──────────            ────────                │
//! │                           Promo                 ProductReview           │
//! │  Customer                 PromoUsage                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conventions
//! - `id`: UUID v4 string, used for relations
//! - `*_cents`: money in minor units, wrapped by accessor methods
//! - timestamps are UTC

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Customer
// =============================================================================

/// An account that can shop or, with `is_staff`, manage the shop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// Staff manage orders and the catalog but cannot place orders.
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Catalog
// =============================================================================

/// A product category, optionally nested under a parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A supplier of products.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Link between a supplier and a product it delivers.
///
/// One row per (supplier, product) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SupplierProduct {
    pub id: String,
    pub supplier_id: String,
    pub product_id: String,
    pub is_main_supplier: bool,
    pub supply_price_cents: i64,
    pub last_supply_date: Option<DateTime<Utc>>,
}

/// A product available for sale.
///
/// ## Invariants
/// - `price_cents >= 0`
/// - `quantity >= 0` (also a CHECK constraint in the schema)
///
/// Products are never hard-deleted; order history references them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Article number, unique business identifier.
    pub article: String,

    pub description: Option<String>,

    pub category_id: Option<String>,

    /// Current price in cents. Carts read this live.
    pub price_cents: i64,

    /// Units in stock.
    pub quantity: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether at least one unit is in stock.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// A stock delivery from a supplier.
///
/// `total_price_cents = quantity × price_per_unit_cents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SupplierPurchase {
    pub id: String,
    pub supplier_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub price_per_unit_cents: i64,
    pub total_price_cents: i64,
    pub purchase_date: DateTime<Utc>,
}

// =============================================================================
// Cart
// =============================================================================

/// A stored cart line. The price is not stored; see [`crate::cart::CartLine`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartItem {
    pub id: String,
    pub cart_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub added_at: DateTime<Utc>,
}

// =============================================================================
// Promotions
// =============================================================================

/// A fixed-amount promo code.
///
/// Eligibility rules live in [`crate::promo`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Promo {
    pub id: String,
    /// Upper-case code, unique.
    pub code: String,
    pub description: Option<String>,
    /// Fixed discount in cents, always positive.
    pub discount_cents: i64,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub min_order_cents: i64,
    pub is_active: bool,
    /// Global cap on redemptions, `None` for unlimited.
    pub max_uses: Option<i64>,
    pub uses_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Promo {
    /// Returns the fixed discount as Money.
    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    /// Returns the minimum order amount as Money.
    #[inline]
    pub fn min_order_amount(&self) -> Money {
        Money::from_cents(self.min_order_cents)
    }
}

/// Append-only record that a customer redeemed a promo.
///
/// One row per (promo, customer); its existence makes the promo
/// invalid for that customer from then on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PromoUsage {
    pub id: String,
    pub promo_id: String,
    pub customer_id: String,
    pub order_id: Option<String>,
    pub discount_cents: i64,
    pub used_at: DateTime<Utc>,
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
///
/// ## Lifecycle
/// ```text
/// processing ──► paid ──► shipped ──► delivered
///      │           │          │
///      └───────────┴──────────┴──────► cancelled
/// ```
/// Moves are forward only; `delivered` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Processing,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Processing,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Stored and displayed name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "processing",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// No further transitions are possible.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    const fn rank(&self) -> u8 {
        match self {
            OrderStatus::Processing => 0,
            OrderStatus::Paid => 1,
            OrderStatus::Shipped => 2,
            OrderStatus::Delivered => 3,
            OrderStatus::Cancelled => 4,
        }
    }

    /// Whether staff may move an order from `self` to `next`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            OrderStatus::Cancelled => true,
            _ => next.rank() > self.rank(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Order
// =============================================================================

/// An immutable priced snapshot of a completed checkout.
///
/// ## Invariant
/// `total = subtotal + shipping_cost - discount`, computed once at creation
/// and never recomputed from live product prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub phone: String,
    pub email: String,
    pub comment: String,
    pub client_timezone: String,
    pub subtotal_cents: i64,
    pub shipping_cost_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub promo_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    /// Checks the frozen total against its components.
    pub fn totals_consistent(&self) -> bool {
        self.total_cents == self.subtotal_cents + self.shipping_cost_cents - self.discount_cents
    }
}

/// A line of an order with the unit price frozen at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub price_cents: i64,
}

impl OrderItem {
    /// Frozen unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.price_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Reviews
// =============================================================================

/// A customer's rating of a product. Only moderated reviews are public.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductReview {
    pub id: String,
    pub product_id: String,
    pub customer_id: String,
    /// 1 to 5 stars.
    pub rating: i64,
    pub text: String,
    pub is_moderated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
