//! # Review Repository
//!
//! Product reviews. One review per (product, customer); only moderated
//! reviews are public, and editing a review sends it back to moderation.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::new_id;
use crate::repository::product::ProductRepository;
use zoo_core::stats::average_rating;
use zoo_core::validation::{validate_rating, validate_review_text};
use zoo_core::{CoreError, ProductReview};

const REVIEW_COLUMNS: &str =
    "id, product_id, customer_id, rating, text, is_moderated, created_at, updated_at";

/// Average moderated rating of a product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRating {
    pub product_id: String,
    pub review_count: usize,
    /// `None` until a review is moderated.
    pub average: Option<Decimal>,
}

/// Repository for product reviews.
#[derive(Debug, Clone)]
pub struct ReviewRepository {
    pool: SqlitePool,
}

impl ReviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReviewRepository { pool }
    }

    /// Adds a customer's review of a product, pending moderation.
    ///
    /// ## Errors
    /// - `Validation` for a rating outside 1..=5 or blank text
    /// - `ProductNotFound`
    /// - `DuplicateReview` when the customer already reviewed the product
    pub async fn add(
        &self,
        customer_id: &str,
        product_id: &str,
        rating: i64,
        text: &str,
    ) -> DbResult<ProductReview> {
        validate_rating(rating).map_err(CoreError::from)?;
        let text = validate_review_text(text).map_err(CoreError::from)?;

        ProductRepository::new(self.pool.clone())
            .require(product_id)
            .await?;

        let now = Utc::now();
        let review = ProductReview {
            id: new_id(),
            product_id: product_id.to_string(),
            customer_id: customer_id.to_string(),
            rating,
            text,
            is_moderated: false,
            created_at: now,
            updated_at: now,
        };

        debug!(product_id = %product_id, customer_id = %customer_id, rating, "Adding review");

        sqlx::query(
            r#"
            INSERT INTO product_reviews (
                id, product_id, customer_id, rating, text, is_moderated, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7)
            "#,
        )
        .bind(&review.id)
        .bind(&review.product_id)
        .bind(&review.customer_id)
        .bind(review.rating)
        .bind(&review.text)
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            err if err.is_unique_violation_on("product_reviews.") => {
                DbError::Domain(CoreError::DuplicateReview {
                    product_id: product_id.to_string(),
                })
            }
            other => other,
        })?;

        Ok(review)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ProductReview>> {
        let review = sqlx::query_as::<_, ProductReview>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM product_reviews WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    /// Edits the customer's own review. The edit needs moderation again.
    pub async fn update_own(
        &self,
        customer_id: &str,
        review_id: &str,
        rating: i64,
        text: &str,
    ) -> DbResult<ProductReview> {
        validate_rating(rating).map_err(CoreError::from)?;
        let text = validate_review_text(text).map_err(CoreError::from)?;

        let result = sqlx::query(
            r#"
            UPDATE product_reviews
            SET rating = ?3, text = ?4, is_moderated = 0, updated_at = ?5
            WHERE id = ?1 AND customer_id = ?2
            "#,
        )
        .bind(review_id)
        .bind(customer_id)
        .bind(rating)
        .bind(&text)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ReviewNotFound(review_id.to_string()).into());
        }

        self.require(review_id).await
    }

    /// Deletes the customer's own review.
    pub async fn delete_own(&self, customer_id: &str, review_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM product_reviews WHERE id = ?1 AND customer_id = ?2")
            .bind(review_id)
            .bind(customer_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ReviewNotFound(review_id.to_string()).into());
        }

        Ok(())
    }

    /// Approves a review for public display.
    pub async fn moderate(&self, review_id: &str) -> DbResult<ProductReview> {
        let result =
            sqlx::query("UPDATE product_reviews SET is_moderated = 1, updated_at = ?2 WHERE id = ?1")
                .bind(review_id)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ReviewNotFound(review_id.to_string()).into());
        }

        info!(review_id = %review_id, "Review moderated");
        self.require(review_id).await
    }

    /// Public reviews of a product, newest first.
    pub async fn list_moderated(&self, product_id: &str) -> DbResult<Vec<ProductReview>> {
        let reviews = sqlx::query_as::<_, ProductReview>(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM product_reviews
            WHERE product_id = ?1 AND is_moderated = 1
            ORDER BY created_at DESC, id
            "#
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    /// Reviews waiting for moderation, oldest first.
    pub async fn list_pending(&self) -> DbResult<Vec<ProductReview>> {
        let reviews = sqlx::query_as::<_, ProductReview>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM product_reviews WHERE is_moderated = 0 ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    /// Average of the moderated ratings.
    pub async fn product_rating(&self, product_id: &str) -> DbResult<ProductRating> {
        let ratings: Vec<i64> = sqlx::query_scalar(
            "SELECT rating FROM product_reviews WHERE product_id = ?1 AND is_moderated = 1",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ProductRating {
            product_id: product_id.to_string(),
            review_count: ratings.len(),
            average: average_rating(&ratings),
        })
    }

    async fn require(&self, id: &str) -> DbResult<ProductReview> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ReviewNotFound(id.to_string()).into())
    }
}
