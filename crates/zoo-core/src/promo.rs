//! # Promo Validator
//!
//! Eligibility and discount rules for fixed-amount promo codes.
//!
//! ## Check Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  check(promo, amount, already_used, now)                                │
//! │                                                                         │
//! │  1. is_active? ─────────────── no ──► Inactive                          │
//! │  2. now >= valid_from? ─────── no ──► NotYetValid                       │
//! │     now <= valid_until? ────── no ──► Expired                           │
//! │  3. amount >= min_order? ───── no ──► BelowMinimum { min }              │
//! │  4. uses_count < max_uses? ─── no ──► UsageLimitReached                 │
//! │  5. not used by customer? ──── no ──► AlreadyUsed                       │
//! │                                                                         │
//! │  First failing check wins.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Whether the customer already used the code is a storage question, so
//! callers pass it in as `already_used`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Promo;
use crate::validation::{normalize_promo_code, validate_discount_cents, validate_price_cents};

// =============================================================================
// Rejection
// =============================================================================

/// Why a promo cannot be applied. The message is shown to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromoRejection {
    #[error("promo code is not active")]
    Inactive,

    #[error("promo code is not valid yet")]
    NotYetValid,

    #[error("promo code has expired")]
    Expired,

    #[error("order amount must be at least {min}")]
    BelowMinimum { min: Money },

    #[error("promo code usage limit has been reached")]
    UsageLimitReached,

    #[error("promo code has already been used")]
    AlreadyUsed,
}

// =============================================================================
// Validation
// =============================================================================

/// Runs every eligibility check in order and reports the first failure.
pub fn check(
    promo: &Promo,
    order_amount: Money,
    already_used: bool,
    now: DateTime<Utc>,
) -> Result<(), PromoRejection> {
    if !promo.is_active {
        return Err(PromoRejection::Inactive);
    }

    if now < promo.valid_from {
        return Err(PromoRejection::NotYetValid);
    }
    if now > promo.valid_until {
        return Err(PromoRejection::Expired);
    }

    if order_amount < promo.min_order_amount() {
        return Err(PromoRejection::BelowMinimum {
            min: promo.min_order_amount(),
        });
    }

    if let Some(max_uses) = promo.max_uses {
        if promo.uses_count >= max_uses {
            return Err(PromoRejection::UsageLimitReached);
        }
    }

    if already_used {
        return Err(PromoRejection::AlreadyUsed);
    }

    Ok(())
}

/// `true` when [`check`] passes.
pub fn is_valid(promo: &Promo, order_amount: Money, already_used: bool, now: DateTime<Utc>) -> bool {
    check(promo, order_amount, already_used, now).is_ok()
}

/// Discount for an order amount: the fixed discount, capped at the amount.
///
/// Never negative and never above `amount`, so a discounted total cannot
/// drop below zero.
pub fn calculate_discount(promo: &Promo, amount: Money) -> Money {
    if !amount.is_positive() {
        return Money::zero();
    }
    promo.discount().min(amount).max(Money::zero())
}

/// Result of applying a valid promo to an amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoQuote {
    pub code: String,
    pub discount_cents: i64,
    pub final_amount_cents: i64,
}

impl PromoQuote {
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }
}

/// Validates the promo and prices the discount in one step.
///
/// ## Errors
/// `PromoInvalid` carrying the first failing check.
pub fn quote(
    promo: &Promo,
    amount: Money,
    already_used: bool,
    now: DateTime<Utc>,
) -> CoreResult<PromoQuote> {
    check(promo, amount, already_used, now).map_err(|reason| CoreError::PromoInvalid {
        code: promo.code.clone(),
        reason,
    })?;

    let discount = calculate_discount(promo, amount);
    Ok(PromoQuote {
        code: promo.code.clone(),
        discount_cents: discount.cents(),
        final_amount_cents: (amount - discount).cents(),
    })
}

// =============================================================================
// Staff Input
// =============================================================================

/// Staff input for creating or editing a promo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoDraft {
    pub code: String,
    pub description: Option<String>,
    pub discount_cents: i64,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub min_order_cents: i64,
    pub max_uses: Option<i64>,
    pub is_active: bool,
}

impl PromoDraft {
    /// Validates the draft and returns it with the code normalized.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        self.code = normalize_promo_code(&self.code)?;
        validate_discount_cents(self.discount_cents)?;
        validate_price_cents(self.min_order_cents)?;

        if self.valid_until < self.valid_from {
            return Err(ValidationError::InvalidFormat {
                field: "valid_until".to_string(),
                reason: "must not be before valid_from".to_string(),
            });
        }

        if let Some(max_uses) = self.max_uses {
            if max_uses <= 0 {
                return Err(ValidationError::MustBePositive {
                    field: "max_uses".to_string(),
                });
            }
        }

        self.description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(self)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
