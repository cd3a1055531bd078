//! # Checkout Command
//!
//! Turns the customer's cart into an order.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout(customer, request)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  session promo (untrusted) ──┐                                          │
//! │  config.checkout_policy() ───┼──► CheckoutService::place_order (one tx) │
//! │  request ────────────────────┘           │                              │
//! │                                          ├── Ok        → clear promo    │
//! │                                          ├── tampering → clear promo    │
//! │                                          └── other err → promo kept     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info, warn};
use zoo_core::checkout::CheckoutRequest;
use zoo_core::{CoreError, PromoRejection};
use zoo_db::{DbError, OrderReceipt};

use crate::error::ApiError;
use crate::state::{AppConfig, DbState, SessionState};

/// Places an order for everything in the customer's cart.
///
/// ## Errors
/// - `CART_ERROR` for an empty cart
/// - `INSUFFICIENT_STOCK` when any line exceeds current stock
/// - `PROMO_TAMPERING` when the session discount disagrees with the
///   recomputed one; the session promo is cleared
/// - `FORBIDDEN` for staff accounts
///
/// A session promo that is unknown or no longer valid does not fail the
/// checkout; the receipt carries a `promo_notice` instead.
pub async fn checkout(
    db: &DbState,
    sessions: &SessionState,
    config: &AppConfig,
    customer_id: &str,
    request: CheckoutRequest,
) -> Result<OrderReceipt, ApiError> {
    debug!(customer_id = %customer_id, "checkout command");

    let session_promo = sessions.applied_promo(customer_id).await;
    let result = db
        .inner()
        .checkout()
        .place_order(
            customer_id,
            session_promo.as_ref(),
            request,
            &config.checkout_policy(),
        )
        .await;

    match result {
        Ok(receipt) => {
            sessions.clear_promo(customer_id).await;
            info!(
                order_id = %receipt.order.id,
                total = %config.format_money(receipt.order.total()),
                "Checkout complete"
            );
            Ok(receipt)
        }
        Err(err) => {
            if clears_session_promo(&err) {
                warn!(customer_id = %customer_id, error = %err, "Session promo cleared after failed checkout");
                sessions.clear_promo(customer_id).await;
            }
            Err(err.into())
        }
    }
}

/// Failures after which the session promo can never succeed.
fn clears_session_promo(err: &DbError) -> bool {
    matches!(
        err,
        DbError::Domain(CoreError::PromoTampering { .. })
            | DbError::Domain(CoreError::PromoInvalid {
                reason: PromoRejection::AlreadyUsed | PromoRejection::UsageLimitReached,
                ..
            })
    )
}
