//! # Session State
//!
//! Per-customer ephemeral values kept between requests.
//!
//! ## What Lives Here
//! Only the applied promo: `apply_promo` stores the code and the discount
//! it computed, `checkout` reads them back. Everything else (cart, orders)
//! is in the database.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Promo Lifecycle                              │
//! │                                                                         │
//! │  apply_promo("welcome5") ──► set_promo(customer, {WELCOME5, "5.00"})    │
//! │                                    │                                    │
//! │  cart changes ─────────────────────┤ refreshed or cleared               │
//! │                                    ▼                                    │
//! │  checkout ──► applied_promo(customer) ──► re-validated by zoo-db        │
//! │                                    │                                    │
//! │          success / tampering ──────┴──► clear_promo(customer)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Trust
//! Session contents are treated as client input. The discount is a decimal
//! string so that checkout compares exactly what a client could have sent.
//!
//! ## Thread Safety
//! `Arc<RwLock<HashMap>>` (tokio). Lookups take the read lock; writes hold
//! the write lock only for the map update.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use zoo_core::checkout::AppliedPromo;

/// Values stored for one customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub applied_promo: Option<AppliedPromo>,
}

/// In-process session store keyed by customer id.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a customer's session, empty when none exists.
    pub async fn get(&self, customer_id: &str) -> Session {
        self.sessions
            .read()
            .await
            .get(customer_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn applied_promo(&self, customer_id: &str) -> Option<AppliedPromo> {
        self.get(customer_id).await.applied_promo
    }

    /// Stores `promo`, replacing any earlier one.
    pub async fn set_promo(&self, customer_id: &str, promo: AppliedPromo) {
        debug!(customer_id = %customer_id, code = %promo.code, "Session promo set");
        self.sessions
            .write()
            .await
            .entry(customer_id.to_string())
            .or_default()
            .applied_promo = Some(promo);
    }

    /// Removes the promo, returning it if one was set.
    pub async fn clear_promo(&self, customer_id: &str) -> Option<AppliedPromo> {
        let mut sessions = self.sessions.write().await;
        let cleared = sessions
            .get_mut(customer_id)
            .and_then(|session| session.applied_promo.take());
        if sessions.get(customer_id).is_some_and(|s| *s == Session::default()) {
            sessions.remove(customer_id);
        }
        if let Some(promo) = &cleared {
            debug!(customer_id = %customer_id, code = %promo.code, "Session promo cleared");
        }
        cleared
    }

    /// Number of customers with a non-empty session.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
