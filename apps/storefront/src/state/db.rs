//! # Database State
//!
//! Wraps the `Database` handle for use in commands.
//!
//! The `Database` from `zoo-db` holds a `SqlitePool`, which is thread-safe,
//! so commands run queries concurrently without extra locking.
//!
//! ## Usage in Commands
//! ```rust,ignore
//! pub async fn search_products(
//!     db: &DbState,
//!     query: &str,
//! ) -> Result<Vec<Product>, ApiError> {
//!     Ok(db.inner().products().search(query, 20).await?)
//! }
//! ```

use zoo_db::{Database, DbConfig, DbResult};

use super::config::AppConfig;

#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Opens the configured database file and applies pending migrations.
    pub async fn open(config: &AppConfig) -> DbResult<Self> {
        let db_config = DbConfig::new(config.database.path.clone())
            .max_connections(config.database.max_connections);
        Ok(DbState::new(Database::new(db_config).await?))
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
