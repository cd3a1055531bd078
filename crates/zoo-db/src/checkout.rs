//! # Checkout
//!
//! Turns a customer's cart into an order inside one SQLite transaction.
//!
//! ## Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    place_order (BEGIN ... COMMIT)                       │
//! │                                                                         │
//! │  1. customer exists, not staff          ──► NotPermitted                │
//! │  2. load cart (live prices + stock)                                     │
//! │     ensure_stock                        ──► EmptyCart / InsufficientStock│
//! │  3. session promo ──► decide_promo      ──► PromoTampering / drop       │
//! │  4. OrderTotals::compute, INSERT orders                                 │
//! │  5. per line: INSERT order_items (price frozen)                         │
//! │              UPDATE products ... WHERE quantity >= n                    │
//! │              0 rows ──► InsufficientStock                               │
//! │  6. promo applied: INSERT promo_usages, uses_count + 1                  │
//! │  7. DELETE cart_items                                                   │
//! │                                                                         │
//! │  Any `?` before COMMIT drops the transaction: nothing is written.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All reads and writes go through the transaction itself; with an
//! in-memory pool of one connection, touching the pool while the
//! transaction is open would wait forever.

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::DbResult;
use crate::repository::order::find_order;
use crate::repository::{cart, new_id, product, promo};
use zoo_core::checkout::{
    decide_promo, ensure_stock, AppliedPromo, CheckoutPolicy, CheckoutRequest, OrderTotals,
    PromoDecision, PromoNotice,
};
use zoo_core::{CoreError, Customer, Order, OrderItem, OrderStatus};

/// What a successful checkout hands back.
#[derive(Debug, Clone, Serialize)]
pub struct OrderReceipt {
    pub order: Order,
    pub items: Vec<OrderItem>,
    /// Set when the session promo was dropped and the order went ahead
    /// without it.
    pub promo_notice: Option<PromoNotice>,
}

/// The order assembler.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    pool: SqlitePool,
}

impl CheckoutService {
    pub fn new(pool: SqlitePool) -> Self {
        CheckoutService { pool }
    }

    /// Places an order from the customer's cart.
    ///
    /// ## Arguments
    /// * `customer_id` - The shopper
    /// * `session_promo` - Promo applied earlier in the session, if any.
    ///   Its discount text is re-derived, never trusted.
    /// * `request` - Shipping and contact fields as submitted
    /// * `policy` - Shipping cost and contact/timezone defaults
    ///
    /// ## Errors
    /// - `CustomerNotFound`, `NotPermitted` (staff accounts)
    /// - `EmptyCart`, `InsufficientStock`
    /// - `PromoTampering` when the session discount disagrees
    /// - `PromoInvalid { AlreadyUsed }` when a concurrent checkout redeemed
    ///   the same promo first
    ///
    /// On any error nothing is written.
    pub async fn place_order(
        &self,
        customer_id: &str,
        session_promo: Option<&AppliedPromo>,
        request: CheckoutRequest,
        policy: &CheckoutPolicy,
    ) -> DbResult<OrderReceipt> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // ---------------------------------------------------------------------
        // 1. Who is ordering
        // ---------------------------------------------------------------------
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, username, email, phone, address, birth_date, is_staff, created_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::CustomerNotFound(customer_id.to_string()))?;

        if customer.is_staff {
            return Err(CoreError::not_permitted("staff accounts cannot place orders").into());
        }

        // ---------------------------------------------------------------------
        // 2. Cart and stock
        // ---------------------------------------------------------------------
        let cart = cart::load_cart(&mut tx, customer_id).await?;
        ensure_stock(&cart)?;
        let subtotal = cart.total_price();

        debug!(
            customer_id = %customer_id,
            lines = cart.lines.len(),
            subtotal = %subtotal,
            "Checkout started"
        );

        // ---------------------------------------------------------------------
        // 3. Session promo
        // ---------------------------------------------------------------------
        let stored_promo = match session_promo {
            Some(applied) => promo::find_by_code(&mut tx, &applied.code).await?,
            None => None,
        };
        let already_used = match &stored_promo {
            Some(p) => promo::has_used(&mut tx, &p.id, customer_id).await?,
            None => false,
        };

        let decision = decide_promo(
            session_promo,
            stored_promo.as_ref(),
            subtotal,
            already_used,
            now,
        )
        .inspect_err(|err| {
            if let CoreError::PromoTampering { code } = err {
                warn!(customer_id = %customer_id, code = %code, "Session promo discount rejected");
            }
        })?;

        if let Some(notice) = decision.notice() {
            warn!(customer_id = %customer_id, notice = %notice, "Session promo dropped");
        }

        // ---------------------------------------------------------------------
        // 4. Order header
        // ---------------------------------------------------------------------
        let totals = OrderTotals::compute(subtotal, policy.shipping_cost, decision.discount());
        let details = request.into_details(
            customer.email.as_deref(),
            &policy.placeholder_contact,
            &policy.timezones,
        );
        let promo_id = match &decision {
            PromoDecision::Apply { promo_id, .. } => Some(promo_id.clone()),
            _ => None,
        };

        let order_id = new_id();
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, customer_id, status, shipping_address, phone, email, comment,
                client_timezone, subtotal_cents, shipping_cost_cents, discount_cents,
                total_cents, promo_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)
            "#,
        )
        .bind(&order_id)
        .bind(customer_id)
        .bind(OrderStatus::Processing.as_str())
        .bind(&details.shipping_address)
        .bind(&details.phone)
        .bind(&details.email)
        .bind(&details.comment)
        .bind(&details.client_timezone)
        .bind(totals.subtotal.cents())
        .bind(totals.shipping_cost.cents())
        .bind(totals.discount.cents())
        .bind(totals.total.cents())
        .bind(&promo_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        // ---------------------------------------------------------------------
        // 5. Items and stock
        // ---------------------------------------------------------------------
        let mut items = Vec::with_capacity(cart.lines.len());
        for line in &cart.lines {
            let item = OrderItem {
                id: new_id(),
                order_id: order_id.clone(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                price_cents: line.unit_price_cents,
            };

            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, product_id, quantity, price_cents)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.price_cents)
            .execute(&mut *tx)
            .await?;

            if !product::take_stock(&mut tx, &line.product_id, line.quantity).await? {
                return Err(CoreError::InsufficientStock {
                    product: line.product_name.clone(),
                    available: line.stock,
                    requested: line.quantity,
                }
                .into());
            }

            items.push(item);
        }

        // ---------------------------------------------------------------------
        // 6. Promo redemption
        // ---------------------------------------------------------------------
        if let PromoDecision::Apply {
            promo_id,
            code,
            discount,
        } = &decision
        {
            promo::record_usage(&mut tx, promo_id, code, customer_id, &order_id, *discount).await?;
        }

        // ---------------------------------------------------------------------
        // 7. Empty the cart
        // ---------------------------------------------------------------------
        cart::clear_cart(&mut tx, customer_id).await?;

        let order = find_order(&mut tx, &order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.clone()))?;

        tx.commit().await?;

        info!(
            order_id = %order.id,
            customer_id = %customer_id,
            total = %order.total(),
            discount = %order.discount(),
            items = items.len(),
            "Order placed"
        );

        let promo_notice = match decision {
            PromoDecision::Drop(notice) => Some(notice),
            _ => None,
        };

        Ok(OrderReceipt {
            order,
            items,
            promo_notice,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::fixtures;

    #[tokio::test]
    async fn test_staff_cannot_order() {
        let db = fixtures::db().await;
        let admin = fixtures::staff(&db, "admin").await;

        let err = db
            .checkout()
            .place_order(&admin.id, None, CheckoutRequest::default(), &CheckoutPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NotPermitted { .. })));
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let db = fixtures::db().await;
        let alice = fixtures::customer(&db, "alice").await;

        let err = db
            .checkout()
            .place_order(&alice.id, None, CheckoutRequest::default(), &CheckoutPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::EmptyCart)));
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_defaults_filled_in() {
        let db = fixtures::db().await;
        let alice = fixtures::customer(&db, "alice").await;
        let food = fixtures::product(&db, "CAT-FOOD", 1000, 5).await;
        db.carts().add(&alice.id, &food.id, 1).await.unwrap();

        let request = CheckoutRequest {
            client_timezone: Some("Europe/Moscow".to_string()),
            ..Default::default()
        };
        let receipt = db
            .checkout()
            .place_order(&alice.id, None, request, &CheckoutPolicy::default())
            .await
            .unwrap();

        let order = receipt.order;
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.client_timezone, "Europe/Minsk");
        assert_eq!(order.shipping_address, "Not specified");
        assert_eq!(order.phone, "Not specified");
        assert_eq!(order.email, "alice@example.com");
        assert_eq!(order.total_cents, 1000);
        assert!(order.totals_consistent());
        assert!(receipt.promo_notice.is_none());
    }

    #[tokio::test]
    async fn test_failed_stock_decrement_rolls_back_whole_order() {
        let db = fixtures::db().await;
        let alice = fixtures::customer(&db, "alice").await;
        let food = fixtures::product(&db, "CAT-FOOD", 1000, 5).await;
        let toy = fixtures::product(&db, "CAT-TOY", 300, 2).await;
        db.carts().add(&alice.id, &food.id, 2).await.unwrap();
        db.carts().add(&alice.id, &toy.id, 1).await.unwrap();

        // Another sale empties the toy shelf after the cart was read.
        sqlx::query(
            r#"
            CREATE TRIGGER sell_out_toy AFTER INSERT ON orders
            BEGIN
                UPDATE products SET quantity = 0 WHERE article = 'CAT-TOY';
            END
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = db
            .checkout()
            .place_order(&alice.id, None, CheckoutRequest::default(), &CheckoutPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { requested: 1, .. })
        ));

        assert_eq!(db.orders().count().await.unwrap(), 0);
        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(items, 0);
        assert_eq!(db.products().require(&food.id).await.unwrap().quantity, 5);
        assert_eq!(db.products().require(&toy.id).await.unwrap().quantity, 2);
        assert_eq!(db.carts().load(&alice.id).await.unwrap().total_items(), 3);
    }
}
