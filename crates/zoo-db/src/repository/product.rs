//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Substring search on name and article
//! - Insert with validation
//! - Stock and price changes by staff
//! - Transaction-scoped stock helpers used by checkout, cancellation and
//!   supplier purchases
//!
//! ## Stock Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Changes Stock                                    │
//! │                                                                         │
//! │  set_quantity (staff)          quantity := n          (n >= 0)          │
//! │  take_stock (checkout)         quantity -= n  WHERE quantity >= n       │
//! │  return_stock (cancel/restock) quantity += n                            │
//! │                                                                         │
//! │  The schema CHECK (quantity >= 0) backs all three.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::new_id;
use zoo_core::validation::{
    validate_article, validate_name, validate_price_cents, validate_search_query,
    validate_stock_level,
};
use zoo_core::{CoreError, Product};

pub(crate) const PRODUCT_COLUMNS: &str =
    "id, name, article, description, category_id, price_cents, quantity, created_at, updated_at";

/// Fields for a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub article: String,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub price_cents: i64,
    pub quantity: i64,
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let results = repo.search("kibble", 20).await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Searches products by name or article substring.
    ///
    /// An empty query lists products by name.
    ///
    /// ## Arguments
    /// * `query` - Search term (case-insensitive for ASCII)
    /// * `limit` - Maximum results to return
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = validate_search_query(query).map_err(CoreError::from)?;

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list(limit).await;
        }

        let pattern = format!("%{}%", escape_like(&query));

        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE name LIKE ?1 ESCAPE '\' OR article LIKE ?1 ESCAPE '\'
            ORDER BY name, article
            LIMIT ?2
            "#
        ))
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists products sorted by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name, article LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists the products of one category, sorted by name.
    pub async fn list_by_category(&self, category_id: &str) -> DbResult<Vec<Product>> {
        debug!(category_id = %category_id, "Listing products by category");

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE category_id = ?1 ORDER BY name, article"
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its article number.
    pub async fn get_by_article(&self, article: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE article = ?1"
        ))
        .bind(article.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Like [`get_by_id`](Self::get_by_id) but a missing product is an error.
    pub async fn require(&self, id: &str) -> DbResult<Product> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
    }

    /// Inserts a new product.
    ///
    /// ## Errors
    /// - `Validation` for a bad name, article, price or stock
    /// - `UniqueViolation` when the article exists
    /// - `ForeignKeyViolation` for an unknown category
    pub async fn insert(&self, new: NewProduct) -> DbResult<Product> {
        let name = new.name.trim().to_string();
        let article = new.article.trim().to_string();

        validate_name("name", &name).map_err(CoreError::from)?;
        validate_article(&article).map_err(CoreError::from)?;
        validate_price_cents(new.price_cents).map_err(CoreError::from)?;
        validate_stock_level(new.quantity).map_err(CoreError::from)?;

        let now = Utc::now();
        let product = Product {
            id: new_id(),
            name,
            article,
            description: new.description.filter(|d| !d.trim().is_empty()),
            category_id: new.category_id,
            price_cents: new.price_cents,
            quantity: new.quantity,
            created_at: now,
            updated_at: now,
        };

        debug!(article = %product.article, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, article, description, category_id,
                price_cents, quantity, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.article)
        .bind(&product.description)
        .bind(&product.category_id)
        .bind(product.price_cents)
        .bind(product.quantity)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &product.article),
            other => other,
        })?;

        Ok(product)
    }

    /// Sets the stock level (staff correction).
    pub async fn set_quantity(&self, id: &str, quantity: i64) -> DbResult<Product> {
        validate_stock_level(quantity).map_err(CoreError::from)?;

        debug!(id = %id, quantity = %quantity, "Setting stock level");

        let result = sqlx::query("UPDATE products SET quantity = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(quantity)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(id.to_string()).into());
        }

        self.require(id).await
    }

    /// Changes the price. Carts see the new price immediately; orders keep
    /// the price they were placed at.
    pub async fn set_price(&self, id: &str, price_cents: i64) -> DbResult<Product> {
        validate_price_cents(price_cents).map_err(CoreError::from)?;

        debug!(id = %id, price_cents = %price_cents, "Changing price");

        let result =
            sqlx::query("UPDATE products SET price_cents = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(price_cents)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(id.to_string()).into());
        }

        self.require(id).await
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Transaction-scoped stock helpers
// =============================================================================

/// Removes `quantity` units if that many are in stock.
///
/// Returns `false` (and changes nothing) when stock is short, so two
/// concurrent checkouts can never drive it negative.
pub(crate) async fn take_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: i64,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET quantity = quantity - ?2, updated_at = ?3
        WHERE id = ?1 AND quantity >= ?2
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .bind(Utc::now())
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Adds `quantity` units back to stock.
///
/// A sum past `i64::MAX` is rejected with `InvalidQuantity`; SQLite would
/// otherwise store it as a float.
pub(crate) async fn return_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: i64,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET quantity = quantity + ?2, updated_at = ?3
        WHERE id = ?1 AND quantity <= ?4 - ?2
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .bind(Utc::now())
    .bind(i64::MAX)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await?;
        return Err(match exists {
            Some(_) => CoreError::InvalidQuantity { quantity },
            None => CoreError::ProductNotFound(product_id.to_string()),
        }
        .into());
    }

    Ok(())
}

/// Escapes LIKE wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
