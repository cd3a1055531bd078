//! # Cart Repository
//!
//! The cart ledger: one cart per customer, one line per product.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operation                                       │
//! │                                                                         │
//! │  add(customer, product, 2)                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  load product + current line   (live price, live stock)                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  zoo_core::cart::plan_add      ──► InvalidQuantity / OutOfStock         │
//! │       │                            (nothing written)                    │
//! │       ▼                                                                 │
//! │  create cart if missing, upsert the line                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  reload Cart                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock is checked here but not reserved; checkout re-checks it.
//! Lines are addressed by `(customer, item id)` so one customer can never
//! touch another customer's line.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::new_id;
use crate::repository::product::ProductRepository;
use zoo_core::cart::{self, Cart, CartLine, LineChange};
use zoo_core::CoreError;

const LINE_QUERY: &str = r#"
    SELECT
        ci.id AS item_id,
        ci.product_id,
        p.name AS product_name,
        p.article,
        p.price_cents AS unit_price_cents,
        ci.quantity,
        p.quantity AS stock,
        ci.added_at
    FROM cart_items ci
    INNER JOIN carts c ON c.id = ci.cart_id
    INNER JOIN products p ON p.id = ci.product_id
    WHERE c.customer_id = ?1
"#;

/// Repository for the cart ledger.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Loads the customer's cart with live prices and stock.
    ///
    /// A customer without a cart gets an empty one.
    pub async fn load(&self, customer_id: &str) -> DbResult<Cart> {
        let mut conn = self.pool.acquire().await?;
        load_cart(&mut conn, customer_id).await
    }

    /// Adds `quantity` units of a product.
    ///
    /// ## Errors
    /// - `ProductNotFound`
    /// - `InvalidQuantity` when `quantity <= 0`
    /// - `OutOfStock` when the cart would hold more than is in stock;
    ///   the cart is left unchanged
    pub async fn add(&self, customer_id: &str, product_id: &str, quantity: i64) -> DbResult<Cart> {
        debug!(customer_id = %customer_id, product_id = %product_id, quantity, "Adding to cart");

        let product = ProductRepository::new(self.pool.clone())
            .require(product_id)
            .await?;

        let current = self.load(customer_id).await?;
        let in_cart = current
            .line_for_product(product_id)
            .map(|line| line.quantity)
            .unwrap_or(0);

        let new_quantity = cart::plan_add(&product, in_cart, quantity)?;

        let mut tx = self.pool.begin().await?;
        let cart_id = ensure_cart(&mut tx, customer_id).await?;

        sqlx::query(
            r#"
            INSERT INTO cart_items (id, cart_id, product_id, quantity, added_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (cart_id, product_id) DO UPDATE SET quantity = excluded.quantity
            "#,
        )
        .bind(new_id())
        .bind(&cart_id)
        .bind(product_id)
        .bind(new_quantity)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        let cart = load_cart(&mut tx, customer_id).await?;
        tx.commit().await?;

        Ok(cart)
    }

    /// Gets one of the customer's lines.
    pub async fn line(&self, customer_id: &str, item_id: &str) -> DbResult<CartLine> {
        let line = sqlx::query_as::<_, CartLine>(&format!("{LINE_QUERY} AND ci.id = ?2"))
            .bind(customer_id)
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?;

        line.ok_or_else(|| CoreError::CartItemNotFound(item_id.to_string()).into())
    }

    /// Sets a line's quantity. Zero or less removes it.
    pub async fn update(&self, customer_id: &str, item_id: &str, quantity: i64) -> DbResult<Cart> {
        debug!(customer_id = %customer_id, item_id = %item_id, quantity, "Updating cart line");

        let line = self.line(customer_id, item_id).await?;
        let change = cart::plan_update(&line, quantity)?;
        self.apply(customer_id, &line, change).await
    }

    /// Raises a line by one unit if stock allows.
    pub async fn increase(&self, customer_id: &str, item_id: &str) -> DbResult<Cart> {
        let line = self.line(customer_id, item_id).await?;
        let change = cart::plan_increase(&line)?;
        self.apply(customer_id, &line, change).await
    }

    /// Lowers a line by one unit; the last unit removes the line.
    pub async fn decrease(&self, customer_id: &str, item_id: &str) -> DbResult<Cart> {
        let line = self.line(customer_id, item_id).await?;
        let change = cart::plan_decrease(&line);
        self.apply(customer_id, &line, change).await
    }

    /// Deletes a line.
    pub async fn remove(&self, customer_id: &str, item_id: &str) -> DbResult<Cart> {
        debug!(customer_id = %customer_id, item_id = %item_id, "Removing cart line");

        let line = self.line(customer_id, item_id).await?;
        self.apply(customer_id, &line, LineChange::Remove).await
    }

    /// Empties the cart.
    pub async fn clear(&self, customer_id: &str) -> DbResult<u64> {
        debug!(customer_id = %customer_id, "Clearing cart");

        let mut conn = self.pool.acquire().await?;
        clear_cart(&mut conn, customer_id).await
    }

    async fn apply(&self, customer_id: &str, line: &CartLine, change: LineChange) -> DbResult<Cart> {
        match change {
            LineChange::Set(quantity) => {
                sqlx::query("UPDATE cart_items SET quantity = ?2 WHERE id = ?1")
                    .bind(&line.item_id)
                    .bind(quantity)
                    .execute(&self.pool)
                    .await?;
            }
            LineChange::Remove => {
                sqlx::query("DELETE FROM cart_items WHERE id = ?1")
                    .bind(&line.item_id)
                    .execute(&self.pool)
                    .await?;
            }
        }

        self.load(customer_id).await
    }
}

// =============================================================================
// Connection-scoped helpers (shared with checkout)
// =============================================================================

/// Loads a cart on an existing connection or transaction.
pub(crate) async fn load_cart(conn: &mut SqliteConnection, customer_id: &str) -> DbResult<Cart> {
    let lines = sqlx::query_as::<_, CartLine>(&format!("{LINE_QUERY} ORDER BY ci.added_at, ci.id"))
        .bind(customer_id)
        .fetch_all(conn)
        .await?;

    Ok(Cart::new(customer_id, lines))
}

/// Deletes every line of the customer's cart.
pub(crate) async fn clear_cart(conn: &mut SqliteConnection, customer_id: &str) -> DbResult<u64> {
    let result = sqlx::query(
        "DELETE FROM cart_items WHERE cart_id IN (SELECT id FROM carts WHERE customer_id = ?1)",
    )
    .bind(customer_id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

/// Returns the customer's cart ID, creating the cart on first use.
async fn ensure_cart(conn: &mut SqliteConnection, customer_id: &str) -> DbResult<String> {
    sqlx::query(
        r#"
        INSERT INTO carts (id, customer_id, created_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT (customer_id) DO NOTHING
        "#,
    )
    .bind(new_id())
    .bind(customer_id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    let cart_id: String = sqlx::query_scalar("SELECT id FROM carts WHERE customer_id = ?1")
        .bind(customer_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(cart_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::fixtures;

    #[tokio::test]
    async fn test_add_accumulates_single_line() {
        let db = fixtures::db().await;
        let alice = fixtures::customer(&db, "alice").await;
        let food = fixtures::product(&db, "CAT-FOOD", 1000, 5).await;

        let carts = db.carts();
        carts.add(&alice.id, &food.id, 2).await.unwrap();
        let cart = carts.add(&alice.id, &food.id, 1).await.unwrap();

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price().cents(), 3000);
    }

    #[tokio::test]
    async fn test_add_out_of_stock_leaves_cart_unchanged() {
        let db = fixtures::db().await;
        let alice = fixtures::customer(&db, "alice").await;
        let toy = fixtures::product(&db, "DOG-TOY", 500, 3).await;

        let carts = db.carts();
        carts.add(&alice.id, &toy.id, 2).await.unwrap();

        let err = carts.add(&alice.id, &toy.id, 2).await.unwrap_err();
        match err {
            DbError::Domain(CoreError::OutOfStock {
                available,
                in_cart,
                requested,
                ..
            }) => {
                assert_eq!((available, in_cart, requested), (3, 2, 2));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let cart = carts.load(&alice.id).await.unwrap();
        assert_eq!(cart.total_items(), 2);

        let err = carts.add(&alice.id, &toy.id, 0).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidQuantity { .. })));
    }

    #[tokio::test]
    async fn test_cart_reads_live_price() {
        let db = fixtures::db().await;
        let alice = fixtures::customer(&db, "alice").await;
        let bowl = fixtures::product(&db, "BOWL", 400, 10).await;

        db.carts().add(&alice.id, &bowl.id, 2).await.unwrap();
        db.products().set_price(&bowl.id, 450).await.unwrap();

        let cart = db.carts().load(&alice.id).await.unwrap();
        assert_eq!(cart.total_price().cents(), 900);
    }

    #[tokio::test]
    async fn test_update_increase_decrease_remove() {
        let db = fixtures::db().await;
        let alice = fixtures::customer(&db, "alice").await;
        let litter = fixtures::product(&db, "LITTER", 800, 4).await;
        let carts = db.carts();

        let cart = carts.add(&alice.id, &litter.id, 1).await.unwrap();
        let item_id = cart.lines[0].item_id.clone();

        let cart = carts.update(&alice.id, &item_id, 4).await.unwrap();
        assert_eq!(cart.total_items(), 4);

        let err = carts.increase(&alice.id, &item_id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::OutOfStock { .. })));

        let cart = carts.decrease(&alice.id, &item_id).await.unwrap();
        assert_eq!(cart.total_items(), 3);

        let cart = carts.update(&alice.id, &item_id, 1).await.unwrap();
        assert_eq!(cart.total_items(), 1);
        let cart = carts.decrease(&alice.id, &item_id).await.unwrap();
        assert!(cart.is_empty());

        let cart = carts.add(&alice.id, &litter.id, 2).await.unwrap();
        let item_id = cart.lines[0].item_id.clone();
        let cart = carts.update(&alice.id, &item_id, 0).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_lines_are_scoped_to_customer() {
        let db = fixtures::db().await;
        let alice = fixtures::customer(&db, "alice").await;
        let bob = fixtures::customer(&db, "bob").await;
        let brush = fixtures::product(&db, "BRUSH", 300, 5).await;

        let cart = db.carts().add(&alice.id, &brush.id, 1).await.unwrap();
        let item_id = cart.lines[0].item_id.clone();

        let err = db.carts().remove(&bob.id, &item_id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::CartItemNotFound(_))));

        let cart = db.carts().remove(&alice.id, &item_id).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let db = fixtures::db().await;
        let alice = fixtures::customer(&db, "alice").await;
        let a = fixtures::product(&db, "A-1", 100, 5).await;
        let b = fixtures::product(&db, "B-1", 200, 5).await;

        db.carts().add(&alice.id, &a.id, 1).await.unwrap();
        db.carts().add(&alice.id, &b.id, 2).await.unwrap();

        assert_eq!(db.carts().clear(&alice.id).await.unwrap(), 2);
        assert!(db.carts().load(&alice.id).await.unwrap().is_empty());
    }
}
