//! # Review Commands
//!
//! Product reviews. New and edited reviews stay hidden until staff
//! moderate them; ratings average only moderated reviews.

use tracing::debug;
use zoo_core::ProductReview;
use zoo_db::ProductRating;

use super::require_staff;
use crate::error::ApiError;
use crate::state::DbState;

/// Adds the customer's review of a product (one per product).
pub async fn add_review(
    db: &DbState,
    customer_id: &str,
    product_id: &str,
    rating: i64,
    text: &str,
) -> Result<ProductReview, ApiError> {
    debug!(customer_id = %customer_id, product_id = %product_id, rating, "add_review command");
    Ok(db
        .inner()
        .reviews()
        .add(customer_id, product_id, rating, text)
        .await?)
}

pub async fn update_review(
    db: &DbState,
    customer_id: &str,
    review_id: &str,
    rating: i64,
    text: &str,
) -> Result<ProductReview, ApiError> {
    Ok(db
        .inner()
        .reviews()
        .update_own(customer_id, review_id, rating, text)
        .await?)
}

pub async fn delete_review(db: &DbState, customer_id: &str, review_id: &str) -> Result<(), ApiError> {
    Ok(db.inner().reviews().delete_own(customer_id, review_id).await?)
}

/// Public reviews of a product, newest first.
pub async fn list_reviews(db: &DbState, product_id: &str) -> Result<Vec<ProductReview>, ApiError> {
    Ok(db.inner().reviews().list_moderated(product_id).await?)
}

pub async fn product_rating(db: &DbState, product_id: &str) -> Result<ProductRating, ApiError> {
    Ok(db.inner().reviews().product_rating(product_id).await?)
}

// =============================================================================
// Staff Commands
// =============================================================================

pub async fn pending_reviews(db: &DbState, actor_id: &str) -> Result<Vec<ProductReview>, ApiError> {
    require_staff(db, actor_id).await?;
    Ok(db.inner().reviews().list_pending().await?)
}

pub async fn moderate_review(
    db: &DbState,
    actor_id: &str,
    review_id: &str,
) -> Result<ProductReview, ApiError> {
    require_staff(db, actor_id).await?;
    Ok(db.inner().reviews().moderate(review_id).await?)
}
