//! # Commands Module
//!
//! Every operation the storefront exposes, as plain async functions.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs         ◄─── You are here (exports, staff check)
//! ├── catalog.rs     ◄─── Product search, categories, stock, suppliers
//! ├── cart.rs        ◄─── Cart manipulation
//! ├── promo.rs       ◄─── Apply/validate promo codes, staff promo admin
//! ├── checkout.rs    ◄─── Cart → Order
//! ├── order.rs       ◄─── Order history and status changes
//! ├── review.rs      ◄─── Product reviews and moderation
//! └── statistics.rs  ◄─── Staff dashboard
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  Caller (CLI, tests, a future HTTP layer)                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  pub async fn add_to_cart(                                              │
//! │      db: &DbState,             ◄── only the state it needs              │
//! │      sessions: &SessionState,                                           │
//! │      customer_id: &str,        ◄── authenticated actor                  │
//! │      product_id: &str,                                                  │
//! │      quantity: Option<i64>,                                             │
//! │  ) -> Result<CartResponse, ApiError>                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  zoo-db repository / CheckoutService ──► zoo-core rules                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Actors
//! Commands take the acting customer's id. Staff-only commands check
//! `is_staff` first and fail with `FORBIDDEN` otherwise; cart and promo
//! commands refuse staff accounts the same way.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod order;
pub mod promo;
pub mod review;
pub mod statistics;

use zoo_core::Customer;

use crate::error::ApiError;
use crate::state::DbState;

/// Loads the actor and rejects non-staff accounts.
pub(crate) async fn require_staff(db: &DbState, actor_id: &str) -> Result<Customer, ApiError> {
    Ok(db.inner().customers().require_staff(actor_id).await?)
}

/// Loads the actor and rejects staff accounts, which cannot shop.
pub(crate) async fn require_shopper(db: &DbState, actor_id: &str) -> Result<Customer, ApiError> {
    Ok(db.inner().customers().require_shopper(actor_id).await?)
}
