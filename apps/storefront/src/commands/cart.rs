//! # Cart Commands
//!
//! Commands for cart manipulation. The cart itself lives in the database;
//! every response carries live prices and stock.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│  Promo   │────►│  Order   │       │
//! │  │  Cart    │     │          │     │ Applied  │     │  Placed  │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                │             │
//! │                   add_to_cart       apply_promo       checkout         │
//! │                   update/inc/dec    (promo.rs)      (checkout.rs)      │
//! │                   remove                                  │             │
//! │                        │                                  ▼             │
//! │                   clear_cart ───────────────────► (back to empty)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Session Promo
//! Each change re-prices an applied promo so the session discount keeps
//! matching the cart. A promo the cart no longer qualifies for is removed
//! and reported in `promo_notice`.

use serde::Serialize;
use tracing::debug;
use zoo_core::cart::{Cart, CartLine, CartTotals};
use zoo_core::checkout::{AppliedPromo, PromoNotice};

use super::promo::refresh_session_promo;
use super::require_shopper;
use crate::error::ApiError;
use crate::state::{DbState, SessionState};

/// Cart response including lines, totals and the session promo.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
    pub applied_promo: Option<AppliedPromo>,
    /// Set when this change removed the session promo.
    pub promo_notice: Option<PromoNotice>,
}

async fn respond(
    db: &DbState,
    sessions: &SessionState,
    cart: Cart,
) -> Result<CartResponse, ApiError> {
    let (applied_promo, promo_notice) = refresh_session_promo(db, sessions, &cart).await?;
    Ok(CartResponse {
        totals: CartTotals::from(&cart),
        lines: cart.lines,
        applied_promo,
        promo_notice,
    })
}

/// Gets the current cart contents.
pub async fn get_cart(
    db: &DbState,
    sessions: &SessionState,
    customer_id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(customer_id = %customer_id, "get_cart command");
    require_shopper(db, customer_id).await?;
    let cart = db.inner().carts().load(customer_id).await?;
    respond(db, sessions, cart).await
}

/// Adds a product to the cart.
///
/// ## Behavior
/// - Product already in cart: quantity increases
/// - `in_cart + quantity` above stock: `INSUFFICIENT_STOCK`, cart unchanged
/// - Stock is checked, not reserved
/// - Staff accounts: `FORBIDDEN`
///
/// ## Arguments
/// * `product_id` - Product UUID to add
/// * `quantity` - Quantity to add (default: 1)
pub async fn add_to_cart(
    db: &DbState,
    sessions: &SessionState,
    customer_id: &str,
    product_id: &str,
    quantity: Option<i64>,
) -> Result<CartResponse, ApiError> {
    let quantity = quantity.unwrap_or(1);
    debug!(customer_id = %customer_id, product_id = %product_id, quantity, "add_to_cart command");
    require_shopper(db, customer_id).await?;

    let cart = db.inner().carts().add(customer_id, product_id, quantity).await?;
    respond(db, sessions, cart).await
}

/// Sets the quantity of a cart line.
pub async fn update_cart_item(
    db: &DbState,
    sessions: &SessionState,
    customer_id: &str,
    item_id: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(customer_id = %customer_id, item_id = %item_id, quantity, "update_cart_item command");
    require_shopper(db, customer_id).await?;

    let cart = db.inner().carts().update(customer_id, item_id, quantity).await?;
    respond(db, sessions, cart).await
}

/// Adds one unit to a cart line, if stock allows.
pub async fn increase_cart_item(
    db: &DbState,
    sessions: &SessionState,
    customer_id: &str,
    item_id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(customer_id = %customer_id, item_id = %item_id, "increase_cart_item command");
    require_shopper(db, customer_id).await?;

    let cart = db.inner().carts().increase(customer_id, item_id).await?;
    respond(db, sessions, cart).await
}

/// Takes one unit off a cart line; the last unit removes the line.
pub async fn decrease_cart_item(
    db: &DbState,
    sessions: &SessionState,
    customer_id: &str,
    item_id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(customer_id = %customer_id, item_id = %item_id, "decrease_cart_item command");
    require_shopper(db, customer_id).await?;

    let cart = db.inner().carts().decrease(customer_id, item_id).await?;
    respond(db, sessions, cart).await
}

/// Removes a line from the cart.
pub async fn remove_from_cart(
    db: &DbState,
    sessions: &SessionState,
    customer_id: &str,
    item_id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(customer_id = %customer_id, item_id = %item_id, "remove_from_cart command");
    require_shopper(db, customer_id).await?;

    let cart = db.inner().carts().remove(customer_id, item_id).await?;
    respond(db, sessions, cart).await
}

/// Clears all items from the cart and drops the session promo.
pub async fn clear_cart(
    db: &DbState,
    sessions: &SessionState,
    customer_id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(customer_id = %customer_id, "clear_cart command");
    require_shopper(db, customer_id).await?;

    db.inner().carts().clear(customer_id).await?;
    sessions.clear_promo(customer_id).await;
    Ok(CartResponse {
        lines: Vec::new(),
        totals: CartTotals::from(&Cart::new(customer_id, Vec::new())),
        applied_promo: None,
        promo_notice: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_add_and_adjust_lines() {
        let db = fixtures::db().await;
        let sessions = SessionState::new();
        let alice = fixtures::customer(&db, "alice").await;
        let food = fixtures::product(&db, "CAT-001", 1250, 3).await;

        let cart = add_to_cart(&db, &sessions, &alice.id, &food.id, None)
            .await
            .unwrap();
        assert_eq!(cart.totals.total_items, 1);
        let item_id = cart.lines[0].item_id.clone();

        let cart = increase_cart_item(&db, &sessions, &alice.id, &item_id)
            .await
            .unwrap();
        assert_eq!(cart.lines[0].quantity, 2);
        assert_eq!(cart.totals.total_price_cents, 2500);

        let cart = decrease_cart_item(&db, &sessions, &alice.id, &item_id)
            .await
            .unwrap();
        assert_eq!(cart.lines[0].quantity, 1);

        let cart = decrease_cart_item(&db, &sessions, &alice.id, &item_id)
            .await
            .unwrap();
        assert!(cart.lines.is_empty());
    }

    #[tokio::test]
    async fn test_add_beyond_stock_leaves_cart_unchanged() {
        let db = fixtures::db().await;
        let sessions = SessionState::new();
        let alice = fixtures::customer(&db, "alice").await;
        let food = fixtures::product(&db, "CAT-001", 1000, 3).await;

        add_to_cart(&db, &sessions, &alice.id, &food.id, Some(2))
            .await
            .unwrap();
        let err = add_to_cart(&db, &sessions, &alice.id, &food.id, Some(2))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let cart = get_cart(&db, &sessions, &alice.id).await.unwrap();
        assert_eq!(cart.lines[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_other_customers_line_is_not_found() {
        let db = fixtures::db().await;
        let sessions = SessionState::new();
        let alice = fixtures::customer(&db, "alice").await;
        let bob = fixtures::customer(&db, "bob").await;
        let food = fixtures::product(&db, "CAT-001", 1000, 3).await;

        let cart = add_to_cart(&db, &sessions, &alice.id, &food.id, None)
            .await
            .unwrap();
        let err = remove_from_cart(&db, &sessions, &bob.id, &cart.lines[0].item_id)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_clear_cart_drops_session_promo() {
        let db = fixtures::db().await;
        let sessions = SessionState::new();
        let alice = fixtures::customer(&db, "alice").await;
        let food = fixtures::product(&db, "CAT-001", 1000, 3).await;

        add_to_cart(&db, &sessions, &alice.id, &food.id, None)
            .await
            .unwrap();
        sessions
            .set_promo(&alice.id, AppliedPromo::new("WELCOME5", zoo_core::Money::from_cents(500)))
            .await;

        let cart = clear_cart(&db, &sessions, &alice.id).await.unwrap();
        assert!(cart.lines.is_empty());
        assert!(sessions.applied_promo(&alice.id).await.is_none());
    }

    #[tokio::test]
    async fn test_staff_cannot_use_cart() {
        let db = fixtures::db().await;
        let sessions = SessionState::new();
        let admin = fixtures::staff(&db, "admin").await;
        let food = fixtures::product(&db, "CAT-001", 1000, 3).await;

        let err = add_to_cart(&db, &sessions, &admin.id, &food.id, Some(2))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let err = get_cart(&db, &sessions, &admin.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        let err = update_cart_item(&db, &sessions, &admin.id, "item", 1)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        assert!(db.inner().carts().load(&admin.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_huge_quantity_is_out_of_stock() {
        let db = fixtures::db().await;
        let sessions = SessionState::new();
        let alice = fixtures::customer(&db, "alice").await;
        let food = fixtures::product(&db, "CAT-001", 1000, 5).await;

        add_to_cart(&db, &sessions, &alice.id, &food.id, Some(1))
            .await
            .unwrap();
        let err = add_to_cart(&db, &sessions, &alice.id, &food.id, Some(i64::MAX))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let cart = get_cart(&db, &sessions, &alice.id).await.unwrap();
        assert_eq!(cart.totals.total_items, 1);
    }
}
