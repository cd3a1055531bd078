//! # Order Repository
//!
//! Order history and the staff-driven status lifecycle.
//!
//! Orders are written once, by checkout. After that only `status` and
//! `updated_at` ever change; the frozen totals and item prices never do.
//!
//! ## Cancellation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  update_status(order, Cancelled)                                        │
//! │       │                                                                 │
//! │       ▼  BEGIN                                                          │
//! │  load order ──► can_transition_to? ──► no ──► InvalidStatusTransition   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE orders SET status                                               │
//! │  for each item: products.quantity += item.quantity                      │
//! │       │                                                                 │
//! │       ▼  COMMIT                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::DbResult;
use crate::repository::product;
use zoo_core::{CoreError, Money, Order, OrderItem, OrderStatus};

const ORDER_COLUMNS: &str = "id, customer_id, status, shipping_address, phone, email, comment, \
     client_timezone, subtotal_cents, shipping_cost_cents, discount_cents, total_cents, \
     promo_id, created_at, updated_at";

/// An order item with its product's name, for display.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderLine {
    pub item_id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    /// Unit price frozen at checkout.
    pub price_cents: i64,
}

impl OrderLine {
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.price_cents).multiply_quantity(self.quantity)
    }
}

/// An order together with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// Repository for placed orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let mut conn = self.pool.acquire().await?;
        find_order(&mut conn, id).await
    }

    /// Order with lines; any customer's order (staff view).
    pub async fn detail(&self, id: &str) -> DbResult<OrderDetail> {
        let order = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(id.to_string()))?;
        let lines = self.lines(id).await?;

        Ok(OrderDetail { order, lines })
    }

    /// Order with lines, only if it belongs to `customer_id`.
    ///
    /// Another customer's order is reported as not found.
    pub async fn get_for_customer(&self, id: &str, customer_id: &str) -> DbResult<OrderDetail> {
        let detail = self.detail(id).await?;
        if detail.order.customer_id != customer_id {
            return Err(CoreError::OrderNotFound(id.to_string()).into());
        }
        Ok(detail)
    }

    /// Raw order items.
    pub async fn items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT id, order_id, product_id, quantity, price_cents FROM order_items WHERE order_id = ?1",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Order items joined with product names.
    pub async fn lines(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let lines = sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT
                oi.id AS item_id,
                oi.product_id,
                p.name AS product_name,
                oi.quantity,
                oi.price_cents
            FROM order_items oi
            INNER JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = ?1
            ORDER BY p.name
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// A customer's orders, newest first.
    pub async fn list_for_customer(&self, customer_id: &str) -> DbResult<Vec<Order>> {
        debug!(customer_id = %customer_id, "Listing customer orders");

        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = ?1 ORDER BY created_at DESC, id"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Every order, newest first, optionally filtered by status.
    pub async fn list_all(&self, status: Option<OrderStatus>) -> DbResult<Vec<Order>> {
        debug!(status = ?status, "Listing orders");

        let orders = match status {
            Some(status) => {
                sqlx::query_as::<_, Order>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders WHERE status = ?1 ORDER BY created_at DESC, id"
                ))
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Order>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(orders)
    }

    /// Moves an order along its lifecycle.
    ///
    /// ## Errors
    /// - `OrderNotFound`
    /// - `InvalidStatusTransition` for backward or post-terminal moves
    ///
    /// Cancelling returns every item's quantity to stock in the same
    /// transaction.
    pub async fn update_status(&self, id: &str, next: OrderStatus) -> DbResult<Order> {
        let mut tx = self.pool.begin().await?;

        let order = find_order(&mut tx, id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(id.to_string()))?;

        if !order.status.can_transition_to(next) {
            return Err(CoreError::InvalidStatusTransition {
                from: order.status,
                to: next,
            }
            .into());
        }

        let now = Utc::now();
        sqlx::query("UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(next.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await?;

        if next == OrderStatus::Cancelled {
            let items: Vec<(String, i64)> = sqlx::query_as(
                "SELECT product_id, quantity FROM order_items WHERE order_id = ?1",
            )
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

            for (product_id, quantity) in &items {
                product::return_stock(&mut tx, product_id, *quantity).await?;
            }

            debug!(order_id = %id, items = items.len(), "Stock restored");
        }

        tx.commit().await?;

        info!(order_id = %id, from = %order.status, to = %next, "Order status changed");

        Ok(Order {
            status: next,
            updated_at: now,
            ..order
        })
    }

    /// Counts orders (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

pub(crate) async fn find_order(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(order)
}
