//! # Zooshop Storefront
//!
//! Orchestration layer over `zoo-core` and `zoo-db`: configuration,
//! logging, per-customer sessions and the commands the shop exposes.
//!
//! ## Module Organization
//! ```text
//! storefront/
//! ├── lib.rs          ◄─── You are here (tracing, startup)
//! ├── main.rs         ◄─── `zooshop` operator CLI
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   ├── session.rs  ◄─── Applied promo per customer
//! │   └── config.rs   ◄─── zooshop.toml + ZOOSHOP_* overrides
//! ├── commands/       ◄─── cart, promo, checkout, orders, reviews, ...
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Application Startup                               │
//! │                                                                         │
//! │  1. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter                                │
//! │     • Default: info, zoo crates at debug; RUST_LOG overrides            │
//! │                                                                         │
//! │  2. Load Configuration ───────────────────────────────────────────────► │
//! │     • defaults → zooshop.toml → ZOOSHOP_* → validate                    │
//! │                                                                         │
//! │  3. Connect to Database ──────────────────────────────────────────────► │
//! │     • SQLite with WAL mode                                              │
//! │     • Run pending migrations                                            │
//! │                                                                         │
//! │  4. Initialize State Objects ─────────────────────────────────────────► │
//! │     • DbState, SessionState (empty), AppConfig                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;

use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

use state::{AppConfig, DbState, SessionState};

/// Everything a running storefront holds.
#[derive(Debug, Clone)]
pub struct Storefront {
    pub db: DbState,
    pub sessions: SessionState,
    pub config: AppConfig,
}

impl Storefront {
    /// Loads configuration and opens the database.
    ///
    /// ## Errors
    /// Invalid configuration, or a database that cannot be opened or
    /// migrated.
    pub async fn start(config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let config = AppConfig::load(config_path)?;
        info!(
            shop = %config.shop.name,
            db_path = %config.database.path.display(),
            "Configuration loaded"
        );

        Self::with_config(config).await
    }

    /// Opens the database for an already loaded configuration.
    pub async fn with_config(config: AppConfig) -> anyhow::Result<Self> {
        let db = DbState::open(&config).await?;
        info!("Database connected and migrations applied");

        Ok(Storefront {
            db,
            sessions: SessionState::new(),
            config,
        })
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=zoo_db=trace` - Show trace for the database crate only
/// - Default: `info,zoo=debug,sqlx=warn`
///
/// Logs go to stderr so report output on stdout stays machine-readable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,zoo=debug,storefront=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
