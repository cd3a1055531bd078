//! # Promo Commands
//!
//! Applying promo codes in the cart and staff promo administration.
//!
//! ## Apply Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apply_promo(customer, " welcome5 ")                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cart subtotal ──► PromoRepository::quote(code, customer, subtotal)     │
//! │       │                   │                                             │
//! │       │                   ├── unknown code   → PROMO_NOT_FOUND          │
//! │       │                   └── failed check   → PROMO_INVALID (reason)   │
//! │       ▼                                                                 │
//! │  session ← AppliedPromo { "WELCOME5", "5.00" }                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PromoQuote { discount, final amount }                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is written to the database until checkout records the usage.

use chrono::Utc;
use tracing::{debug, info};
use zoo_core::cart::Cart;
use zoo_core::checkout::{AppliedPromo, PromoNotice};
use zoo_core::promo::{PromoDraft, PromoQuote};
use zoo_core::{CoreError, Money, Promo, PromoUsage};
use zoo_db::DbError;

use super::{require_shopper, require_staff};
use crate::error::ApiError;
use crate::state::{DbState, SessionState};

// =============================================================================
// Customer Commands
// =============================================================================

/// Validates `code` against the customer's cart and stores it in the session.
///
/// ## Errors
/// - `FORBIDDEN` for staff accounts
/// - `CART_ERROR` for an empty cart
/// - `NOT_FOUND` for an unknown code
/// - `PROMO_INVALID` when any eligibility check fails
pub async fn apply_promo(
    db: &DbState,
    sessions: &SessionState,
    customer_id: &str,
    code: &str,
) -> Result<PromoQuote, ApiError> {
    debug!(customer_id = %customer_id, code = %code, "apply_promo command");
    require_shopper(db, customer_id).await?;

    let cart = db.inner().carts().load(customer_id).await?;
    if cart.is_empty() {
        return Err(CoreError::EmptyCart.into());
    }

    let quote = db
        .inner()
        .promos()
        .quote(code, customer_id, cart.total_price(), Utc::now())
        .await?;

    sessions
        .set_promo(customer_id, AppliedPromo::new(quote.code.clone(), quote.discount()))
        .await;

    info!(
        customer_id = %customer_id,
        code = %quote.code,
        discount_cents = quote.discount_cents,
        "Promo applied to session"
    );

    Ok(quote)
}

/// Removes the session promo. Returns whether one was set.
pub async fn remove_promo(sessions: &SessionState, customer_id: &str) -> bool {
    debug!(customer_id = %customer_id, "remove_promo command");
    sessions.clear_promo(customer_id).await.is_some()
}

/// Checks `code` against an arbitrary amount without touching the session.
///
/// `amount` is decimal text such as `"25.00"`.
pub async fn validate_promo(
    db: &DbState,
    customer_id: &str,
    code: &str,
    amount: &str,
) -> Result<PromoQuote, ApiError> {
    debug!(customer_id = %customer_id, code = %code, amount = %amount, "validate_promo command");

    let amount = Money::parse_exact(amount).map_err(CoreError::from)?;
    Ok(db
        .inner()
        .promos()
        .quote(code, customer_id, amount, Utc::now())
        .await?)
}

/// Re-prices the session promo after the cart changed.
///
/// Keeps the session discount equal to what checkout will recompute. A
/// promo that no longer fits the cart is removed and reported.
pub(crate) async fn refresh_session_promo(
    db: &DbState,
    sessions: &SessionState,
    cart: &Cart,
) -> Result<(Option<AppliedPromo>, Option<PromoNotice>), ApiError> {
    let customer_id = cart.customer_id.as_str();
    let Some(applied) = sessions.applied_promo(customer_id).await else {
        return Ok((None, None));
    };

    if cart.is_empty() {
        sessions.clear_promo(customer_id).await;
        return Ok((None, None));
    }

    let quoted = db
        .inner()
        .promos()
        .quote(&applied.code, customer_id, cart.total_price(), Utc::now())
        .await;

    match quoted {
        Ok(quote) => {
            let discount = quote.discount();
            let refreshed = AppliedPromo::new(quote.code, discount);
            if refreshed != applied {
                sessions.set_promo(customer_id, refreshed.clone()).await;
            }
            Ok((Some(refreshed), None))
        }
        Err(DbError::Domain(CoreError::PromoNotFound(code))) => {
            sessions.clear_promo(customer_id).await;
            Ok((None, Some(PromoNotice::NotFound { code })))
        }
        Err(DbError::Domain(CoreError::PromoInvalid { code, reason })) => {
            sessions.clear_promo(customer_id).await;
            Ok((None, Some(PromoNotice::NoLongerValid { code, reason })))
        }
        Err(err) => Err(err.into()),
    }
}

// =============================================================================
// Staff Commands
// =============================================================================

pub async fn create_promo(
    db: &DbState,
    actor_id: &str,
    draft: PromoDraft,
) -> Result<Promo, ApiError> {
    require_staff(db, actor_id).await?;
    let promo = db.inner().promos().create(draft).await?;
    info!(code = %promo.code, "Promo created");
    Ok(promo)
}

pub async fn update_promo(
    db: &DbState,
    actor_id: &str,
    promo_id: &str,
    draft: PromoDraft,
) -> Result<Promo, ApiError> {
    require_staff(db, actor_id).await?;
    Ok(db.inner().promos().update(promo_id, draft).await?)
}

pub async fn deactivate_promo(
    db: &DbState,
    actor_id: &str,
    promo_id: &str,
) -> Result<Promo, ApiError> {
    require_staff(db, actor_id).await?;
    Ok(db.inner().promos().deactivate(promo_id).await?)
}

pub async fn list_promos(db: &DbState, actor_id: &str) -> Result<Vec<Promo>, ApiError> {
    require_staff(db, actor_id).await?;
    Ok(db.inner().promos().list().await?)
}

pub async fn promo_usages(
    db: &DbState,
    actor_id: &str,
    promo_id: &str,
) -> Result<Vec<PromoUsage>, ApiError> {
    require_staff(db, actor_id).await?;
    Ok(db.inner().promos().usages(promo_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;
    use crate::error::ErrorCode;
    use chrono::Duration;

    fn draft(code: &str, discount_cents: i64, min_order_cents: i64) -> PromoDraft {
        let now = Utc::now();
        PromoDraft {
            code: code.to_string(),
            description: None,
            discount_cents,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(30),
            min_order_cents,
            max_uses: None,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_apply_promo_stores_session_discount() {
        let db = fixtures::db().await;
        let sessions = SessionState::new();
        let admin = fixtures::staff(&db, "admin").await;
        let alice = fixtures::customer(&db, "alice").await;
        let food = fixtures::product(&db, "CAT-001", 1000, 5).await;

        create_promo(&db, &admin.id, draft("WELCOME5", 500, 2000))
            .await
            .unwrap();
        db.inner().carts().add(&alice.id, &food.id, 3).await.unwrap();

        let quote = apply_promo(&db, &sessions, &alice.id, " welcome5 ")
            .await
            .unwrap();
        assert_eq!(quote.discount_cents, 500);
        assert_eq!(quote.final_amount_cents, 2500);

        let applied = sessions.applied_promo(&alice.id).await.unwrap();
        assert_eq!(applied, AppliedPromo::new("WELCOME5", Money::from_cents(500)));
    }

    #[tokio::test]
    async fn test_apply_promo_rejections() {
        let db = fixtures::db().await;
        let sessions = SessionState::new();
        let admin = fixtures::staff(&db, "admin").await;
        let alice = fixtures::customer(&db, "alice").await;
        let toy = fixtures::product(&db, "DOG-001", 500, 5).await;

        let err = apply_promo(&db, &sessions, &alice.id, "WELCOME5")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);

        create_promo(&db, &admin.id, draft("WELCOME5", 500, 2000))
            .await
            .unwrap();
        db.inner().carts().add(&alice.id, &toy.id, 1).await.unwrap();

        let err = apply_promo(&db, &sessions, &alice.id, "NOPE").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = apply_promo(&db, &sessions, &alice.id, "WELCOME5")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PromoInvalid);
        assert!(sessions.applied_promo(&alice.id).await.is_none());

        db.inner().carts().add(&admin.id, &toy.id, 5).await.unwrap();
        let err = apply_promo(&db, &sessions, &admin.id, "WELCOME5")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        assert!(sessions.applied_promo(&admin.id).await.is_none());
    }

    #[tokio::test]
    async fn test_validate_promo_against_amount() {
        let db = fixtures::db().await;
        let admin = fixtures::staff(&db, "admin").await;
        let alice = fixtures::customer(&db, "alice").await;
        create_promo(&db, &admin.id, draft("BIG", 5000, 0)).await.unwrap();

        // Discount never exceeds the amount.
        let quote = validate_promo(&db, &alice.id, "big", "30.00").await.unwrap();
        assert_eq!(quote.discount_cents, 3000);
        assert_eq!(quote.final_amount_cents, 0);

        let err = validate_promo(&db, &alice.id, "big", "thirty").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_staff_only_promo_admin() {
        let db = fixtures::db().await;
        let alice = fixtures::customer(&db, "alice").await;
        let admin = fixtures::staff(&db, "admin").await;

        let err = create_promo(&db, &alice.id, draft("SPRING", 300, 0))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let promo = create_promo(&db, &admin.id, draft("spring", 300, 0))
            .await
            .unwrap();
        assert_eq!(promo.code, "SPRING");

        let promo = deactivate_promo(&db, &admin.id, &promo.id).await.unwrap();
        assert!(!promo.is_active);
        assert_eq!(list_promos(&db, &admin.id).await.unwrap().len(), 1);
        assert!(promo_usages(&db, &admin.id, &promo.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_drops_promo_that_no_longer_fits() {
        let db = fixtures::db().await;
        let sessions = SessionState::new();
        let admin = fixtures::staff(&db, "admin").await;
        let alice = fixtures::customer(&db, "alice").await;
        let food = fixtures::product(&db, "CAT-001", 1000, 5).await;

        create_promo(&db, &admin.id, draft("WELCOME5", 500, 2000))
            .await
            .unwrap();
        db.inner().carts().add(&alice.id, &food.id, 2).await.unwrap();
        apply_promo(&db, &sessions, &alice.id, "WELCOME5").await.unwrap();

        let line = db.inner().carts().load(&alice.id).await.unwrap().lines[0].clone();
        let cart = db
            .inner()
            .carts()
            .update(&alice.id, &line.item_id, 1)
            .await
            .unwrap();

        let (applied, notice) = refresh_session_promo(&db, &sessions, &cart).await.unwrap();
        assert!(applied.is_none());
        assert!(matches!(notice, Some(PromoNotice::NoLongerValid { .. })));
        assert!(sessions.applied_promo(&alice.id).await.is_none());
    }
}
