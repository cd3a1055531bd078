//! # Checkout Planning
//!
//! The pure half of the order assembler. Everything here decides; nothing
//! here writes. `zoo_db::checkout` runs these decisions inside one SQLite
//! transaction.
//!
//! ## Checkout Decisions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Cart ──► ensure_stock ──► EmptyCart / InsufficientStock                │
//! │                │                                                        │
//! │                ▼                                                        │
//! │  session promo ──► decide_promo                                         │
//! │                │    ├── no session promo       ──► PromoDecision::None  │
//! │                │    ├── code unknown           ──► Drop(NotFound)       │
//! │                │    ├── no longer eligible     ──► Drop(NoLongerValid)  │
//! │                │    ├── asserted ≠ recomputed  ──► Err(PromoTampering)  │
//! │                │    └── asserted = recomputed  ──► Apply { discount }   │
//! │                ▼                                                        │
//! │  OrderTotals::compute  ──► total = subtotal + shipping − discount       │
//! │  CheckoutRequest::into_details ──► placeholders, timezone fallback      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The session is client-backed, so its discount string is a hint that is
//! always recomputed and compared, never used directly.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::promo::{self, PromoRejection};
use crate::types::Promo;
use crate::{DISALLOWED_TIMEZONES, FALLBACK_TIMEZONE, PLACEHOLDER_CONTACT};

// =============================================================================
// Session Promo
// =============================================================================

/// Promo stashed in the customer's session between "apply" and "checkout".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedPromo {
    pub code: String,
    /// Discount as decimal text, e.g. `"5.00"`. Untrusted.
    pub discount: String,
}

impl AppliedPromo {
    pub fn new(code: impl Into<String>, discount: Money) -> Self {
        AppliedPromo {
            code: code.into(),
            discount: discount.to_string(),
        }
    }
}

/// Compares the session-asserted discount with the recomputed one.
///
/// ## Errors
/// `PromoTampering` when the text is not an exact currency amount or names
/// a different amount.
pub fn verify_session_discount(applied: &AppliedPromo, recomputed: Money) -> CoreResult<()> {
    match Money::parse_exact(&applied.discount) {
        Ok(asserted) if asserted == recomputed => Ok(()),
        _ => Err(CoreError::PromoTampering {
            code: applied.code.clone(),
        }),
    }
}

/// Why a session promo was dropped while the order went ahead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromoNotice {
    NotFound { code: String },
    NoLongerValid { code: String, reason: PromoRejection },
}

impl fmt::Display for PromoNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromoNotice::NotFound { code } => {
                write!(f, "Promo code {} was not found and was not applied", code)
            }
            PromoNotice::NoLongerValid { code, reason } => {
                write!(f, "Promo code {} was not applied: {}", code, reason)
            }
        }
    }
}

/// Outcome of re-validating the session promo at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromoDecision {
    /// No promo in the session.
    None,
    /// Promo applies with this discount.
    Apply {
        promo_id: String,
        code: String,
        discount: Money,
    },
    /// Promo is dropped, order continues without a discount.
    Drop(PromoNotice),
}

impl PromoDecision {
    pub fn discount(&self) -> Money {
        match self {
            PromoDecision::Apply { discount, .. } => *discount,
            _ => Money::zero(),
        }
    }

    pub fn notice(&self) -> Option<&PromoNotice> {
        match self {
            PromoDecision::Drop(notice) => Some(notice),
            _ => None,
        }
    }
}

/// Re-validates the session promo against the current subtotal.
///
/// `promo` is the stored promo looked up by the session code (if any),
/// `already_used` whether this customer has a usage row for it.
pub fn decide_promo(
    session: Option<&AppliedPromo>,
    promo: Option<&Promo>,
    subtotal: Money,
    already_used: bool,
    now: DateTime<Utc>,
) -> CoreResult<PromoDecision> {
    let Some(applied) = session else {
        return Ok(PromoDecision::None);
    };

    let Some(promo) = promo else {
        return Ok(PromoDecision::Drop(PromoNotice::NotFound {
            code: applied.code.clone(),
        }));
    };

    if let Err(reason) = promo::check(promo, subtotal, already_used, now) {
        return Ok(PromoDecision::Drop(PromoNotice::NoLongerValid {
            code: promo.code.clone(),
            reason,
        }));
    }

    let discount = promo::calculate_discount(promo, subtotal);
    verify_session_discount(applied, discount)?;

    Ok(PromoDecision::Apply {
        promo_id: promo.id.clone(),
        code: promo.code.clone(),
        discount,
    })
}

// =============================================================================
// Stock & Totals
// =============================================================================

/// Checks the cart is non-empty and every line is covered by stock.
pub fn ensure_stock(cart: &Cart) -> CoreResult<()> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    if let Some(line) = cart.first_shortage() {
        return Err(CoreError::InsufficientStock {
            product: line.product_name.clone(),
            available: line.stock,
            requested: line.quantity,
        });
    }

    Ok(())
}

/// Frozen order numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub discount: Money,
    pub total: Money,
}

impl OrderTotals {
    /// `total = subtotal + shipping_cost - discount`.
    pub fn compute(subtotal: Money, shipping_cost: Money, discount: Money) -> Self {
        OrderTotals {
            subtotal,
            shipping_cost,
            discount,
            total: subtotal + shipping_cost - discount,
        }
    }
}

// =============================================================================
// Contact Details
// =============================================================================

/// Which client timezones are stored and what replaces the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimezonePolicy {
    pub fallback: String,
    pub disallowed: Vec<String>,
}

impl Default for TimezonePolicy {
    fn default() -> Self {
        TimezonePolicy {
            fallback: FALLBACK_TIMEZONE.to_string(),
            disallowed: DISALLOWED_TIMEZONES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TimezonePolicy {
    /// Returns the timezone to store for a client-submitted value.
    ///
    /// ```rust
    /// use zoo_core::checkout::TimezonePolicy;
    ///
    /// let policy = TimezonePolicy::default();
    /// assert_eq!(policy.resolve(None), "Europe/Minsk");
    /// assert_eq!(policy.resolve(Some("Europe/Moscow")), "Europe/Minsk");
    /// assert_eq!(policy.resolve(Some("Europe/Warsaw")), "Europe/Warsaw");
    /// ```
    pub fn resolve(&self, submitted: Option<&str>) -> String {
        match submitted.map(str::trim) {
            Some(tz) if !tz.is_empty() && !self.disallowed.iter().any(|d| d == tz) => {
                tz.to_string()
            }
            _ => self.fallback.clone(),
        }
    }
}

/// Shipping and contact fields as submitted at checkout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub shipping_address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub comment: Option<String>,
    pub client_timezone: Option<String>,
}

/// Contact fields after defaults are filled in, ready to store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub shipping_address: String,
    pub phone: String,
    pub email: String,
    pub comment: String,
    pub client_timezone: String,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

impl CheckoutRequest {
    /// Fills in defaults.
    ///
    /// - blank address or phone → `placeholder`
    /// - blank email → `customer_email`, else empty
    /// - timezone → [`TimezonePolicy::resolve`]
    pub fn into_details(
        self,
        customer_email: Option<&str>,
        placeholder: &str,
        timezones: &TimezonePolicy,
    ) -> OrderDetails {
        OrderDetails {
            shipping_address: non_blank(self.shipping_address.as_deref())
                .unwrap_or_else(|| placeholder.to_string()),
            phone: non_blank(self.phone.as_deref()).unwrap_or_else(|| placeholder.to_string()),
            email: non_blank(self.email.as_deref())
                .or_else(|| non_blank(customer_email))
                .unwrap_or_default(),
            comment: self.comment.map(|c| c.trim().to_string()).unwrap_or_default(),
            client_timezone: timezones.resolve(self.client_timezone.as_deref()),
        }
    }
}

/// Checkout settings that come from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutPolicy {
    pub shipping_cost: Money,
    pub placeholder_contact: String,
    pub timezones: TimezonePolicy,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        CheckoutPolicy {
            shipping_cost: Money::zero(),
            placeholder_contact: PLACEHOLDER_CONTACT.to_string(),
            timezones: TimezonePolicy::default(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
