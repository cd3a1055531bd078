//! # Order Commands
//!
//! Order history for customers; listing and status changes for staff.
//!
//! ## Status Lifecycle
//! ```text
//! processing ──► paid ──► shipped ──► delivered
//!      │           │          │
//!      └───────────┴──────────┴──────► cancelled (stock returned)
//! ```

use std::str::FromStr;

use tracing::debug;
use zoo_core::{CoreError, Order, OrderStatus};
use zoo_db::OrderDetail;

use super::require_staff;
use crate::error::ApiError;
use crate::state::DbState;

fn parse_status(status: &str) -> Result<OrderStatus, ApiError> {
    Ok(OrderStatus::from_str(status).map_err(CoreError::from)?)
}

/// The customer's own orders, newest first.
pub async fn list_my_orders(db: &DbState, customer_id: &str) -> Result<Vec<Order>, ApiError> {
    debug!(customer_id = %customer_id, "list_my_orders command");
    Ok(db.inner().orders().list_for_customer(customer_id).await?)
}

/// One order with its lines.
///
/// Staff can read any order; a customer reading another customer's order
/// gets `NOT_FOUND`.
pub async fn get_order(
    db: &DbState,
    actor_id: &str,
    order_id: &str,
) -> Result<OrderDetail, ApiError> {
    debug!(actor_id = %actor_id, order_id = %order_id, "get_order command");

    let actor = db.inner().customers().require(actor_id).await?;
    let detail = if actor.is_staff {
        db.inner().orders().detail(order_id).await?
    } else {
        db.inner().orders().get_for_customer(order_id, actor_id).await?
    };
    Ok(detail)
}

/// All orders, optionally in one status (staff).
pub async fn list_orders(
    db: &DbState,
    actor_id: &str,
    status: Option<&str>,
) -> Result<Vec<Order>, ApiError> {
    require_staff(db, actor_id).await?;
    let status = status.map(parse_status).transpose()?;
    Ok(db.inner().orders().list_all(status).await?)
}

/// Moves an order to `status` (staff).
///
/// ## Errors
/// - `VALIDATION_ERROR` for an unknown status name
/// - `BUSINESS_LOGIC` for a backward or post-terminal move
pub async fn set_order_status(
    db: &DbState,
    actor_id: &str,
    order_id: &str,
    status: &str,
) -> Result<Order, ApiError> {
    require_staff(db, actor_id).await?;
    let next = parse_status(status)?;
    Ok(db.inner().orders().update_status(order_id, next).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{cart, checkout, fixtures};
    use crate::error::ErrorCode;
    use crate::state::{AppConfig, SessionState};
    use zoo_core::checkout::CheckoutRequest;

    async fn place(db: &DbState, customer_id: &str, product_id: &str, quantity: i64) -> Order {
        let sessions = SessionState::new();
        cart::add_to_cart(db, &sessions, customer_id, product_id, Some(quantity))
            .await
            .unwrap();
        checkout::checkout(
            db,
            &sessions,
            &AppConfig::default(),
            customer_id,
            CheckoutRequest::default(),
        )
        .await
        .unwrap()
        .order
    }

    #[tokio::test]
    async fn test_customers_only_see_their_orders() {
        let db = fixtures::db().await;
        let admin = fixtures::staff(&db, "admin").await;
        let alice = fixtures::customer(&db, "alice").await;
        let bob = fixtures::customer(&db, "bob").await;
        let food = fixtures::product(&db, "CAT-001", 1000, 10).await;

        let order = place(&db, &alice.id, &food.id, 2).await;

        assert_eq!(list_my_orders(&db, &alice.id).await.unwrap().len(), 1);
        assert!(list_my_orders(&db, &bob.id).await.unwrap().is_empty());

        let detail = get_order(&db, &alice.id, &order.id).await.unwrap();
        assert_eq!(detail.lines.len(), 1);
        assert_eq!(detail.lines[0].quantity, 2);

        let err = get_order(&db, &bob.id, &order.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        assert!(get_order(&db, &admin.id, &order.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_status_changes_are_staff_only() {
        let db = fixtures::db().await;
        let admin = fixtures::staff(&db, "admin").await;
        let alice = fixtures::customer(&db, "alice").await;
        let food = fixtures::product(&db, "CAT-001", 1000, 10).await;
        let order = place(&db, &alice.id, &food.id, 2).await;

        let err = set_order_status(&db, &alice.id, &order.id, "paid")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let paid = set_order_status(&db, &admin.id, &order.id, "Paid")
            .await
            .unwrap();
        assert_eq!(paid.status, OrderStatus::Paid);

        let err = set_order_status(&db, &admin.id, &order.id, "processing")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        let err = set_order_status(&db, &admin.id, &order.id, "lost")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_list_orders_by_status() {
        let db = fixtures::db().await;
        let admin = fixtures::staff(&db, "admin").await;
        let alice = fixtures::customer(&db, "alice").await;
        let food = fixtures::product(&db, "CAT-001", 1000, 10).await;

        let first = place(&db, &alice.id, &food.id, 1).await;
        place(&db, &alice.id, &food.id, 1).await;
        set_order_status(&db, &admin.id, &first.id, "cancelled")
            .await
            .unwrap();

        assert_eq!(list_orders(&db, &admin.id, None).await.unwrap().len(), 2);
        let cancelled = list_orders(&db, &admin.id, Some("cancelled")).await.unwrap();
        assert_eq!(cancelled.len(), 1);
        assert_eq!(cancelled[0].id, first.id);

        // Cancelling returned the unit.
        let food = db.inner().products().require(&food.id).await.unwrap();
        assert_eq!(food.quantity, 9);
    }
}
