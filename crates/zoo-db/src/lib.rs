//! # zoo-db: Database Layer for Zooshop
//!
//! SQLite persistence for the shop, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Zooshop Data Flow                                │
//! │                                                                         │
//! │  storefront command (add_to_cart, checkout, statistics ...)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     zoo-db (THIS CRATE)                         │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐   │    │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │   │    │
//! │  │   │   (pool.rs)   │    │  cart, promo,  │    │  (embedded)  │   │    │
//! │  │   │               │◄───│  order, ...    │    │ 001_catalog  │   │    │
//! │  │   │  SqlitePool   │    │                │    │ 002_carts_.. │   │    │
//! │  │   │               │◄───│ CheckoutService│    │ 003_reviews  │   │    │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘   │    │
//! │  │                                                                 │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (path from zooshop.toml)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`checkout`] - The transactional order assembler
//! - [`seed`] - Demo data for development
//!
//! ## Usage
//!
//! ```rust,ignore
//! use zoo_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("zooshop.db")).await?;
//!
//! db.carts().add(&customer_id, &product_id, 2).await?;
//! let receipt = db.checkout().place_order(&customer_id, None, request, &policy).await?;
//! let dashboard = db.statistics().dashboard().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{CheckoutService, OrderReceipt};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::cart::CartRepository;
pub use repository::catalog::{CatalogRepository, NewSupplier};
pub use repository::customer::{CustomerRepository, NewCustomer};
pub use repository::order::{OrderDetail, OrderLine, OrderRepository};
pub use repository::product::{NewProduct, ProductRepository};
pub use repository::promo::PromoRepository;
pub use repository::review::{ProductRating, ReviewRepository};
pub use repository::statistics::StatisticsRepository;
