//! # zoo-core: Pure Business Logic for Zooshop
//!
//! This crate holds the rules of the shop as pure functions with zero I/O
//! dependencies. Everything that touches SQLite lives in `zoo-db`; everything
//! that touches sessions or the command line lives in `apps/storefront`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Zooshop Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/storefront (commands, CLI)                 │   │
//! │  │   add_to_cart, apply_promo, checkout, update_order_status ...   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    zoo-db (Database Layer)                      │   │
//! │  │        repositories, checkout transaction, migrations           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                ★ zoo-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │  ┌────────┐ ┌────────┐ ┌────────┐ ┌──────────┐ ┌────────┐       │   │
//! │  │  │ money  │ │  cart  │ │ promo  │ │ checkout │ │ stats  │       │   │
//! │  │  └────────┘ └────────┘ └────────┘ └──────────┘ └────────┘       │   │
//! │  │  ┌────────┐ ┌────────┐ ┌────────────┐                           │   │
//! │  │  │ types  │ │ error  │ │ validation │                           │   │
//! │  │  └────────┘ └────────┘ └────────────┘                           │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (Product, Promo, Order, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//! - [`cart`] - Cart ledger rules and live-price totals
//! - [`promo`] - Promo code eligibility and discount
//! - [`checkout`] - Checkout planning and session discount verification
//! - [`stats`] - Statistics reducers over historical orders
//!
//! ## Example Usage
//!
//! ```rust
//! use zoo_core::money::Money;
//!
//! let price = Money::from_cents(1000); // 10.00
//! let line = price.multiply_quantity(2);
//! assert_eq!(line.to_string(), "20.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod promo;
pub mod stats;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use promo::PromoRejection;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Timezone stored on an order when the client sends none or a disallowed one.
pub const FALLBACK_TIMEZONE: &str = "Europe/Minsk";

/// Client timezones that are never stored on an order.
///
/// ## Business Reason
/// The shop operates in Belarus; legacy browser settings reporting Moscow
/// time are replaced with the local zone.
pub const DISALLOWED_TIMEZONES: &[&str] = &["Europe/Moscow"];

/// Text stored for shipping address or phone left blank at checkout.
pub const PLACEHOLDER_CONTACT: &str = "Not specified";

/// Maximum length of a promo code.
pub const MAX_PROMO_CODE_LEN: usize = 20;

/// Number of products reported in each top-N ranking.
pub const TOP_PRODUCTS_LIMIT: usize = 3;

/// Youngest age, in full years, accepted for a customer's birth date.
pub const MIN_CUSTOMER_AGE: i64 = 18;
