//! # State Module
//!
//! Storefront state, split into focused types instead of a single struct.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐           │
//! │  │   DbState    │  │  SessionState    │  │    AppConfig     │           │
//! │  │              │  │                  │  │                  │           │
//! │  │  Database    │  │  Arc<RwLock<     │  │  [database]      │           │
//! │  │  (SQLite     │  │    HashMap<      │  │  [shop]          │           │
//! │  │   pool)      │  │   customer,      │  │  [checkout]      │           │
//! │  │              │  │   Session>>>     │  │                  │           │
//! │  └──────────────┘  └──────────────────┘  └──────────────────┘           │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: Database has internal connection pool (thread-safe)        │
//! │  • SessionState: tokio RwLock around the session map                   │
//! │  • AppConfig: Read-only after loading                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands take only the state they need, e.g. `get_cart(&DbState, ..)`
//! versus `checkout(&DbState, &SessionState, &AppConfig, ..)`.

pub mod config;
mod db;
mod session;

pub use config::{AppConfig, ConfigError};
pub use db::DbState;
pub use session::{Session, SessionState};
