//! # Validation Module
//!
//! Input validation for Zooshop.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: storefront command                                            │
//! │  └── THIS MODULE: field rules, normalization                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: zoo-core rules (cart, promo, checkout)                        │
//! │  └── stock, eligibility, tamper checks                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── CHECK (quantity >= 0), CHECK (rating BETWEEN 1 AND 5)              │
//! │  ├── UNIQUE (article), UNIQUE (promo_id, customer_id)                   │
//! │  └── Foreign key constraints                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use zoo_core::validation::{normalize_promo_code, validate_article};
//!
//! assert!(validate_article("CAT-FOOD-2").is_ok());
//! assert_eq!(normalize_promo_code(" spring5 ").unwrap(), "SPRING5");
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::stats::age_on;
use crate::{MAX_PROMO_CODE_LEN, MIN_CUSTOMER_AGE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn is_code_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates a product article number.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, digits, hyphens and underscores only
pub fn validate_article(article: &str) -> ValidationResult<()> {
    required("article", article)?;
    max_len("article", article, 50)?;

    if !article.trim().chars().all(is_code_char) {
        return Err(ValidationError::InvalidFormat {
            field: "article".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (product, category, supplier).
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    required(field, name)?;
    max_len(field, name, 200)
}

/// Validates a search query and returns it trimmed.
///
/// An empty query is allowed and means "everything".
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    max_len("query", query, 100)?;
    Ok(query.trim().to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents. Zero is allowed.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a stock level. Zero is allowed.
pub fn validate_stock_level(quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a delivery quantity, which must be positive.
pub fn validate_purchase_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a review rating (1 to 5 stars).
pub fn validate_rating(rating: i64) -> ValidationResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 1,
            max: 5,
        });
    }
    Ok(())
}

/// Validates a birth date: not in the future and at least
/// [`MIN_CUSTOMER_AGE`] full years before `today`.
pub fn validate_birth_date(birth: NaiveDate, today: NaiveDate) -> ValidationResult<()> {
    if birth > today {
        return Err(ValidationError::InvalidFormat {
            field: "birth_date".to_string(),
            reason: "date is in the future".to_string(),
        });
    }
    if age_on(birth, today) < MIN_CUSTOMER_AGE {
        return Err(ValidationError::OutOfRange {
            field: "age".to_string(),
            min: MIN_CUSTOMER_AGE,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates review text and returns it trimmed.
pub fn validate_review_text(text: &str) -> ValidationResult<String> {
    required("text", text)?;
    max_len("text", text, 2000)?;
    Ok(text.trim().to_string())
}

// =============================================================================
// Promo Validators
// =============================================================================

/// Validates a promo code and returns its canonical upper-case form.
///
/// ## Rules
/// - Must not be empty
/// - At most 20 characters
/// - Letters, digits, hyphens and underscores only
///
/// Lookups and inserts both go through this function, so `spring5`
/// and `SPRING5` name the same promo.
pub fn normalize_promo_code(code: &str) -> ValidationResult<String> {
    required("code", code)?;
    max_len("code", code, MAX_PROMO_CODE_LEN)?;

    let code = code.trim();
    if !code.chars().all(is_code_char) {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code.to_uppercase())
}

/// Validates a promo discount, which must be positive.
pub fn validate_discount_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "discount".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a UUID string format.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    required("id", id)?;

    uuid::Uuid::parse_str(id.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
