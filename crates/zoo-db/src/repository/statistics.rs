//! # Statistics Repository
//!
//! Loads the raw inputs of the staff dashboard. All arithmetic (mean,
//! median, mode, variance, rankings) happens in `zoo_core::stats`.
//!
//! ```text
//! orders.total_cents ───────────────► summarize()      ─┐
//! orders.status ────────────────────► count_by_status() ├─► Dashboard
//! order_items ⋈ products ⋈ categories ► rank / top-N    ─┤
//! products GROUP BY category ───────────────────────────┤
//! products, customers ──────────────► ages / listings  ─┘
//! ```
//!
//! Nothing is cached; every call reads the current tables.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::product::PRODUCT_COLUMNS;
use zoo_core::stats::{CategoryProductCount, Dashboard, DashboardInputs, SoldLine};
use zoo_core::{Customer, Money, OrderStatus, Product};

/// Repository for statistics inputs.
#[derive(Debug, Clone)]
pub struct StatisticsRepository {
    pool: SqlitePool,
}

impl StatisticsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StatisticsRepository { pool }
    }

    /// Total of every order, whatever its status.
    pub async fn order_totals(&self) -> DbResult<Vec<Money>> {
        let totals: Vec<i64> = sqlx::query_scalar("SELECT total_cents FROM orders")
            .fetch_all(&self.pool)
            .await?;

        Ok(totals.into_iter().map(Money::from_cents).collect())
    }

    /// Status of every order.
    pub async fn order_statuses(&self) -> DbResult<Vec<OrderStatus>> {
        let statuses: Vec<OrderStatus> = sqlx::query_scalar("SELECT status FROM orders")
            .fetch_all(&self.pool)
            .await?;

        Ok(statuses)
    }

    /// Every order item with its product and category.
    pub async fn sold_lines(&self) -> DbResult<Vec<SoldLine>> {
        let lines = sqlx::query_as::<_, SoldLine>(
            r#"
            SELECT
                p.id AS product_id,
                p.name AS product_name,
                c.id AS category_id,
                c.name AS category_name,
                oi.quantity,
                oi.price_cents
            FROM order_items oi
            INNER JOIN products p ON p.id = oi.product_id
            LEFT JOIN categories c ON c.id = p.category_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Product count per category, categories without products included.
    pub async fn products_per_category(&self) -> DbResult<Vec<CategoryProductCount>> {
        let counts = sqlx::query_as::<_, CategoryProductCount>(
            r#"
            SELECT
                c.id AS category_id,
                c.name AS category_name,
                COUNT(p.id) AS product_count
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            GROUP BY c.id, c.name
            ORDER BY product_count DESC, c.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Every product, unordered.
    pub async fn products(&self) -> DbResult<Vec<Product>> {
        let products =
            sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products"))
                .fetch_all(&self.pool)
                .await?;

        Ok(products)
    }

    /// Every account, staff included, unordered.
    pub async fn customers(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, username, email, phone, address, birth_date, is_staff, created_at
            FROM customers
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Builds the full dashboard from the current tables.
    pub async fn dashboard(&self) -> DbResult<Dashboard> {
        let inputs = DashboardInputs {
            order_totals: self.order_totals().await?,
            statuses: self.order_statuses().await?,
            sold: self.sold_lines().await?,
            products_per_category: self.products_per_category().await?,
            products: self.products().await?,
            customers: self.customers().await?,
        };

        debug!(
            orders = inputs.order_totals.len(),
            sold_lines = inputs.sold.len(),
            customers = inputs.customers.len(),
            "Building statistics dashboard"
        );

        Ok(Dashboard::build(inputs, Utc::now().date_naive()))
    }
}
