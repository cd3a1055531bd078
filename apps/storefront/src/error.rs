//! # API Error Type
//!
//! Unified error type for storefront commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Zooshop                                │
//! │                                                                         │
//! │  Caller                      Storefront                                 │
//! │  ──────                      ──────────                                 │
//! │                                                                         │
//! │  commands::checkout::checkout(...)                                      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::QueryFailed("...") ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Business Rule? ─── DbError::Domain(CoreError) ── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "PROMO_INVALID", "message": "Promo code WELCOME5 ..." }     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal causes (SQL text, connection details) are logged with
//! `tracing::error!` and replaced by a generic message.

use serde::Serialize;
use zoo_core::CoreError;
use zoo_db::DbError;

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Not enough \"Dry cat food\" in stock: available 1, requested 2"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Resource already exists (409)
    Conflict,

    /// Actor lacks permission (403)
    Forbidden,

    /// Database operation failed (500)
    DatabaseError,

    /// Business logic error (422)
    BusinessLogic,

    /// Internal error (500)
    Internal,

    /// Cart operation failed
    CartError,

    /// Not enough stock for cart or checkout
    InsufficientStock,

    /// Promo code rejected
    PromoInvalid,

    /// Session promo disagrees with the recomputed discount
    PromoTampering,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates a cart error.
    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => ApiError::from(core),
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        let code = match &err {
            CoreError::ProductNotFound(_)
            | CoreError::CustomerNotFound(_)
            | CoreError::CartItemNotFound(_)
            | CoreError::OrderNotFound(_)
            | CoreError::ReviewNotFound(_)
            | CoreError::PromoNotFound(_) => ErrorCode::NotFound,
            CoreError::InvalidQuantity { .. } | CoreError::Validation(_) => {
                ErrorCode::ValidationError
            }
            CoreError::OutOfStock { .. } | CoreError::InsufficientStock { .. } => {
                ErrorCode::InsufficientStock
            }
            CoreError::EmptyCart => ErrorCode::CartError,
            CoreError::PromoInvalid { .. } => ErrorCode::PromoInvalid,
            CoreError::PromoTampering { .. } => ErrorCode::PromoTampering,
            CoreError::InvalidStatusTransition { .. } => ErrorCode::BusinessLogic,
            CoreError::DuplicateReview { .. } => ErrorCode::Conflict,
            CoreError::NotPermitted { .. } => ErrorCode::Forbidden,
        };
        ApiError::new(code, message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
