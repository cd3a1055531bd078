//! # Promo Repository
//!
//! Promo codes and their usage records.
//!
//! Eligibility is decided by `zoo_core::promo`; this module loads the
//! inputs (`Promo`, "has this customer used it") and stores the results.
//!
//! ## Single Use Per Customer
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  has_used(promo, customer)    ──► check() → AlreadyUsed                 │
//! │                                                                         │
//! │  Two checkouts racing past that check:                                  │
//! │     checkout A ─► INSERT promo_usages ✓                                 │
//! │     checkout B ─► INSERT promo_usages ✗ UNIQUE(promo_id, customer_id)   │
//! │                   └─► PromoInvalid { AlreadyUsed }, B rolls back        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::new_id;
use zoo_core::promo::{self, PromoDraft, PromoQuote};
use zoo_core::{CoreError, Money, Promo, PromoRejection, PromoUsage};

const PROMO_COLUMNS: &str = "id, code, description, discount_cents, valid_from, valid_until, \
     min_order_cents, is_active, max_uses, uses_count, created_at";

/// Repository for promo codes.
#[derive(Debug, Clone)]
pub struct PromoRepository {
    pool: SqlitePool,
}

impl PromoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PromoRepository { pool }
    }

    /// Creates a promo from a staff draft.
    ///
    /// ## Errors
    /// - `Validation` for a malformed draft
    /// - `UniqueViolation` when the code exists
    pub async fn create(&self, draft: PromoDraft) -> DbResult<Promo> {
        let draft = draft.validated().map_err(CoreError::from)?;

        let promo = Promo {
            id: new_id(),
            code: draft.code,
            description: draft.description,
            discount_cents: draft.discount_cents,
            valid_from: draft.valid_from,
            valid_until: draft.valid_until,
            min_order_cents: draft.min_order_cents,
            is_active: draft.is_active,
            max_uses: draft.max_uses,
            uses_count: 0,
            created_at: Utc::now(),
        };

        debug!(code = %promo.code, discount_cents = promo.discount_cents, "Creating promo");

        sqlx::query(
            r#"
            INSERT INTO promos (
                id, code, description, discount_cents, valid_from, valid_until,
                min_order_cents, is_active, max_uses, uses_count, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10)
            "#,
        )
        .bind(&promo.id)
        .bind(&promo.code)
        .bind(&promo.description)
        .bind(promo.discount_cents)
        .bind(promo.valid_from)
        .bind(promo.valid_until)
        .bind(promo.min_order_cents)
        .bind(promo.is_active)
        .bind(promo.max_uses)
        .bind(promo.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_code(e, &promo.code))?;

        info!(code = %promo.code, "Promo created");
        Ok(promo)
    }

    /// Replaces a promo's editable fields. The usage counter is kept.
    pub async fn update(&self, id: &str, draft: PromoDraft) -> DbResult<Promo> {
        let draft = draft.validated().map_err(CoreError::from)?;

        debug!(id = %id, code = %draft.code, "Updating promo");

        let result = sqlx::query(
            r#"
            UPDATE promos SET
                code = ?2,
                description = ?3,
                discount_cents = ?4,
                valid_from = ?5,
                valid_until = ?6,
                min_order_cents = ?7,
                is_active = ?8,
                max_uses = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&draft.code)
        .bind(&draft.description)
        .bind(draft.discount_cents)
        .bind(draft.valid_from)
        .bind(draft.valid_until)
        .bind(draft.min_order_cents)
        .bind(draft.is_active)
        .bind(draft.max_uses)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_code(e, &draft.code))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::PromoNotFound(id.to_string()).into());
        }

        self.require(id).await
    }

    /// Switches a promo off. Existing orders keep their discount.
    pub async fn deactivate(&self, id: &str) -> DbResult<Promo> {
        debug!(id = %id, "Deactivating promo");

        let result = sqlx::query("UPDATE promos SET is_active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::PromoNotFound(id.to_string()).into());
        }

        self.require(id).await
    }

    /// Looks a promo up by code, case-insensitively.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Promo>> {
        let mut conn = self.pool.acquire().await?;
        find_by_code(&mut conn, code).await
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Promo>> {
        let promo = sqlx::query_as::<_, Promo>(&format!(
            "SELECT {PROMO_COLUMNS} FROM promos WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(promo)
    }

    async fn require(&self, id: &str) -> DbResult<Promo> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::PromoNotFound(id.to_string()).into())
    }

    /// Lists promos, newest first.
    pub async fn list(&self) -> DbResult<Vec<Promo>> {
        let promos = sqlx::query_as::<_, Promo>(&format!(
            "SELECT {PROMO_COLUMNS} FROM promos ORDER BY created_at DESC, code"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(promos)
    }

    /// Whether the customer already redeemed this promo.
    pub async fn has_used(&self, promo_id: &str, customer_id: &str) -> DbResult<bool> {
        let mut conn = self.pool.acquire().await?;
        has_used(&mut conn, promo_id, customer_id).await
    }

    /// Redemptions of a promo, newest first.
    pub async fn usages(&self, promo_id: &str) -> DbResult<Vec<PromoUsage>> {
        let usages = sqlx::query_as::<_, PromoUsage>(
            r#"
            SELECT id, promo_id, customer_id, order_id, discount_cents, used_at
            FROM promo_usages
            WHERE promo_id = ?1
            ORDER BY used_at DESC
            "#,
        )
        .bind(promo_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(usages)
    }

    /// Validates `code` for `customer_id` against `amount` and prices it.
    ///
    /// ## Errors
    /// - `PromoNotFound` for an unknown code
    /// - `PromoInvalid { reason }` when a check fails
    pub async fn quote(
        &self,
        code: &str,
        customer_id: &str,
        amount: Money,
        now: DateTime<Utc>,
    ) -> DbResult<PromoQuote> {
        let promo = self
            .get_by_code(code)
            .await?
            .ok_or_else(|| CoreError::PromoNotFound(code.trim().to_string()))?;

        let already_used = self.has_used(&promo.id, customer_id).await?;
        let quote = promo::quote(&promo, amount, already_used, now)?;

        debug!(
            code = %quote.code,
            customer_id = %customer_id,
            discount_cents = quote.discount_cents,
            "Promo quoted"
        );

        Ok(quote)
    }
}

// =============================================================================
// Connection-scoped helpers (shared with checkout)
// =============================================================================

pub(crate) async fn find_by_code(conn: &mut SqliteConnection, code: &str) -> DbResult<Option<Promo>> {
    let promo = sqlx::query_as::<_, Promo>(&format!(
        "SELECT {PROMO_COLUMNS} FROM promos WHERE code = ?1"
    ))
    .bind(code.trim().to_uppercase())
    .fetch_optional(conn)
    .await?;

    Ok(promo)
}

pub(crate) async fn has_used(
    conn: &mut SqliteConnection,
    promo_id: &str,
    customer_id: &str,
) -> DbResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM promo_usages WHERE promo_id = ?1 AND customer_id = ?2",
    )
    .bind(promo_id)
    .bind(customer_id)
    .fetch_one(conn)
    .await?;

    Ok(count > 0)
}

/// Stores a redemption and bumps the promo's counter.
///
/// The counter only moves while `uses_count < max_uses`; a full promo comes
/// back as `PromoInvalid { UsageLimitReached }`. A second redemption by the
/// same customer hits the unique index and comes back as
/// `PromoInvalid { AlreadyUsed }`.
pub(crate) async fn record_usage(
    conn: &mut SqliteConnection,
    promo_id: &str,
    code: &str,
    customer_id: &str,
    order_id: &str,
    discount: Money,
) -> DbResult<PromoUsage> {
    let usage = PromoUsage {
        id: new_id(),
        promo_id: promo_id.to_string(),
        customer_id: customer_id.to_string(),
        order_id: Some(order_id.to_string()),
        discount_cents: discount.cents(),
        used_at: Utc::now(),
    };

    let claimed = sqlx::query(
        r#"
        UPDATE promos SET uses_count = uses_count + 1
        WHERE id = ?1 AND (max_uses IS NULL OR uses_count < max_uses)
        "#,
    )
    .bind(promo_id)
    .execute(&mut *conn)
    .await?;

    if claimed.rows_affected() == 0 {
        return Err(CoreError::PromoInvalid {
            code: code.to_string(),
            reason: PromoRejection::UsageLimitReached,
        }
        .into());
    }

    sqlx::query(
        r#"
        INSERT INTO promo_usages (id, promo_id, customer_id, order_id, discount_cents, used_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&usage.id)
    .bind(&usage.promo_id)
    .bind(&usage.customer_id)
    .bind(&usage.order_id)
    .bind(usage.discount_cents)
    .bind(usage.used_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        err if err.is_unique_violation_on("promo_usages.") => {
            DbError::Domain(CoreError::PromoInvalid {
                code: code.to_string(),
                reason: PromoRejection::AlreadyUsed,
            })
        }
        other => other,
    })?;

    Ok(usage)
}

fn duplicate_code(err: sqlx::Error, code: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { field, .. } => DbError::duplicate(field, code),
        other => other,
    }
}
